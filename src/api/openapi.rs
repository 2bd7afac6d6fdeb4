use crate::api::handlers::{health, user};
use crate::wechat;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        user::login::weixin_login,
        user::home::home,
        user::web_view::web_view,
    ),
    components(schemas(
        health::Health,
        user::types::ApiMessage,
        user::types::WeixinLoginRequest,
        user::types::WeixinLoginData,
        user::types::WeixinLoginResponse,
        wechat::WxProfile,
        wechat::Watermark,
    )),
    tags(
        (name = "user", description = "Mini-program session authentication"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
