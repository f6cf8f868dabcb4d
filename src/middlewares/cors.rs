use actix_cors::Cors;

/// `origins` 为空时允许任意来源（本地开发）
pub fn create_cors(origins: &[String]) -> Cors {
    let cors = if origins.is_empty() {
        Cors::default().allowed_origin_fn(|_, _req_head| true)
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        // 前端会带 Authorization 与自定义 Header
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
