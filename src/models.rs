use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "panitia")]
    pub username: String,
    #[schema(example = "rahasia")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub admin_id: String,
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}
