//! Test helpers.

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*};

use rewards_app::{
    context::AppContext,
    domain::{claims::MockClaimsService, promotions::MockPromotionsService},
};

use crate::state::State;

fn strict_claims_mock() -> MockClaimsService {
    let mut claims = MockClaimsService::new();

    claims.expect_create_claim().never();
    claims.expect_get_claim().never();
    claims.expect_summarize_claims().never();

    claims
}

fn strict_promotions_mock() -> MockPromotionsService {
    let mut promotions = MockPromotionsService::new();

    promotions.expect_create_promotion().never();
    promotions.expect_activate_promotion().never();
    promotions.expect_list_promotions().never();

    promotions
}

pub(crate) fn state_with_claims(claims: MockClaimsService) -> Arc<State> {
    Arc::new(State::new(AppContext {
        promotions: Arc::new(strict_promotions_mock()),
        claims: Arc::new(claims),
    }))
}

pub(crate) fn state_with_promotions(promotions: MockPromotionsService) -> Arc<State> {
    Arc::new(State::new(AppContext {
        promotions: Arc::new(promotions),
        claims: Arc::new(strict_claims_mock()),
    }))
}

pub(crate) fn claims_service(claims: MockClaimsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_claims(claims)))
            .push(route),
    )
}

pub(crate) fn promotions_service(promotions: MockPromotionsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_promotions(promotions)))
            .push(route),
    )
}
