use async_graphql::http::{GraphiQLSource, ALL_WEBSOCKET_PROTOCOLS};
use async_graphql::Data;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::{Html, IntoResponse, Response},
    Extension,
};

use crate::auth::{Identity, JwtService};
use crate::gql::AppSchema;
use crate::state::AppState;

/// POST /graphql - queries and mutations, run as the identity the auth
/// middleware resolved for this request.
pub async fn graphql_handler(
    Extension(schema): Extension<AppSchema>,
    Extension(identity): Extension<Identity>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner().data(identity)).await.into()
}

/// GET /graphql - subscriptions over graphql-ws or graphql-transport-ws.
/// The token travels in the `connection_init` payload, since browsers cannot
/// set headers on a WebSocket handshake.
pub async fn graphql_ws_handler(
    State(state): State<AppState>,
    Extension(schema): Extension<AppSchema>,
    protocol: GraphQLProtocol,
    websocket: WebSocketUpgrade,
) -> Response {
    let jwt = state.jwt_service().clone();
    websocket
        .protocols(ALL_WEBSOCKET_PROTOCOLS)
        .on_upgrade(move |stream| {
            GraphQLWebSocket::new(stream, schema, protocol)
                .on_connection_init(move |payload| async move {
                    let mut data = Data::default();
                    data.insert(connection_identity(&jwt, &payload));
                    Ok(data)
                })
                .serve()
        })
}

/// GET /graphiql
pub async fn graphiql() -> impl IntoResponse {
    Html(
        GraphiQLSource::build()
            .endpoint("/graphql")
            .subscription_endpoint("/graphql")
            .finish(),
    )
}

/// Identity from a `connection_init` payload such as
/// `{"authorization": "Bearer <jwt>"}`.
pub fn connection_identity(jwt: &JwtService, payload: &serde_json::Value) -> Identity {
    let header = ["authorization", "Authorization"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(|value| value.as_str()));

    let identity = jwt.identify(header);
    if header.is_some() && matches!(identity, Identity::Anonymous) {
        tracing::warn!("rejected token on websocket connection init");
    }
    identity
}
