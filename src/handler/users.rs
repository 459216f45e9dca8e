use axum::{middleware, response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    dtos::userdtos::{FilterUserDto, UserData, UserResponseDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
};

pub fn users_handler() -> Router {
    Router::new().route(
        "/me",
        get(get_me).layer(middleware::from_fn(|state, req, next| {
            role_check(
                state,
                req,
                next,
                vec![UserRole::PropertyManager, UserRole::Contractor, UserRole::Admin],
            )
        })),
    )
}

pub async fn get_me(
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let filtered_user = FilterUserDto::filter_user(&user.user);

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: filtered_user,
        },
    }))
}
