//! App Router

use salvo::Router;

use crate::promotions;

pub(crate) fn app_router() -> Router {
    Router::with_path("v1")
        .push(Router::with_path("promotions").get(promotions::index::handler))
        .push(
            Router::with_path("promotion")
                // Sibling order matters: the summary route must be tried
                // before the `{promotion}` wildcard.
                .push(
                    Router::with_path("{claim_type}/grants/total")
                        .get(promotions::summary::handler),
                )
                .push(
                    Router::with_path("{promotion}")
                        .post(promotions::claim::handler)
                        .push(
                            Router::with_path("claims/{claim}")
                                .get(promotions::get_claim::handler),
                        ),
                ),
        )
}
