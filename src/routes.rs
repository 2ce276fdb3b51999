use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::{debug, info};

use crate::{
    AppState, csrf,
    entities::movie,
    error::{AppError, AppResult},
    forms::{AddForm, EditForm, FieldErrors},
    models::NewMovie,
    ranking,
    templates::{self, EditView},
};

pub fn add_path(external_id: i64) -> String {
    format!("/add/{external_id}")
}

pub fn edit_path(id: i32) -> String {
    format!("/edit/id={id}")
}

pub fn delete_path(id: i32) -> String {
    format!("/delete/id={id}")
}

/// Parses the `id=<n>` path segment used by the edit and delete pages.
fn movie_id(segment: &str) -> AppResult<i32> {
    segment
        .strip_prefix("id=")
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| AppError::NotFound(format!("page /{segment}")))
}

fn parse_external_id(segment: &str) -> AppResult<i64> {
    segment.parse().map_err(|_| AppError::NotFound(format!("page /add/{segment}")))
}

pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut movies = state.store.list_by_rating().await?;

    let changes = ranking::assign(&mut movies);
    if !changes.is_empty() {
        debug!(changed = changes.len(), total = movies.len(), "saving rankings");
        state.store.save_rankings(&changes).await?;
    }

    Ok(Html(templates::index_page(&movies)))
}

pub async fn add_form(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, token) = csrf::issue(jar);
    (jar, Html(templates::add_page(&token, "", &FieldErrors::default())))
}

pub async fn search(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<AddForm>,
) -> AppResult<Response> {
    state.check_csrf(&jar, &form.csrf_token)?;

    let title = match form.validate() {
        Ok(title) => title,
        Err(errors) => {
            let (jar, token) = csrf::issue(jar);
            let body = templates::add_page(&token, &form.title, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, jar, Html(body)).into_response());
        },
    };

    let results = state.metadata.search(&title).await?;
    Ok(Html(templates::select_page(&title, &results)).into_response())
}

pub async fn select(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let external_id = parse_external_id(&segment)?;
    let detail = state.metadata.fetch(external_id).await?;
    let new = NewMovie::from_detail(detail, &state.config.tmdb_image_base_url);

    let movie = match state.store.get_by_title(&new.title).await? {
        Some(existing) if new.describes(&existing) => {
            debug!(id = existing.id, title = %existing.title, "movie already in collection");
            existing
        },
        Some(existing) => {
            debug!(id = existing.id, tmdb_id = external_id, "title taken by a different movie");
            return Err(AppError::DuplicateTitle(existing.title));
        },
        None => {
            let movie = state.store.insert(new).await?;
            info!(id = movie.id, title = %movie.title, tmdb_id = external_id, "added movie");
            movie
        },
    };

    let (jar, token) = csrf::issue(jar);
    let action = add_path(external_id);
    let body = templates::edit_page(EditView {
        movie: &movie,
        action: &action,
        carry_title: true,
        csrf_token: &token,
        values: None,
        errors: &FieldErrors::default(),
    });
    Ok((jar, Html(body)))
}

pub async fn add_review(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    jar: SignedCookieJar,
    Form(form): Form<EditForm>,
) -> AppResult<Response> {
    state.check_csrf(&jar, &form.csrf_token)?;
    let external_id = parse_external_id(&segment)?;

    let title = form
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::NotFound(format!("movie for entry {external_id}")))?;
    let movie = state
        .store
        .get_by_title(title)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("movie \"{title}\"")))?;

    apply_edit(&state, jar, movie, &form, &add_path(external_id), true).await
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let movie = find_movie(&state, &segment).await?;

    let (jar, token) = csrf::issue(jar);
    let action = edit_path(movie.id);
    let body = templates::edit_page(EditView {
        movie: &movie,
        action: &action,
        carry_title: false,
        csrf_token: &token,
        values: None,
        errors: &FieldErrors::default(),
    });
    Ok((jar, Html(body)))
}

pub async fn edit(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    jar: SignedCookieJar,
    Form(form): Form<EditForm>,
) -> AppResult<Response> {
    state.check_csrf(&jar, &form.csrf_token)?;

    let movie = find_movie(&state, &segment).await?;
    let action = edit_path(movie.id);
    apply_edit(&state, jar, movie, &form, &action, false).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> AppResult<Redirect> {
    let id = movie_id(&segment)?;
    state.store.delete(id).await?;
    info!(id, "deleted movie");
    Ok(Redirect::to("/"))
}

async fn find_movie(state: &AppState, segment: &str) -> AppResult<movie::Model> {
    let id = movie_id(segment)?;
    state.store.get(id).await?.ok_or_else(|| AppError::NotFound(format!("movie {id}")))
}

/// Stores a valid rating and review, or shows the form again with messages.
async fn apply_edit(
    state: &AppState,
    jar: SignedCookieJar,
    mut movie: movie::Model,
    form: &EditForm,
    action: &str,
    carry_title: bool,
) -> AppResult<Response> {
    match form.validate() {
        Ok(valid) => {
            movie.rating = Some(valid.rating);
            movie.review = Some(valid.review);
            let movie = state.store.update(movie).await?;
            info!(id = movie.id, rating = ?movie.rating, "updated review");
            Ok(Redirect::to("/").into_response())
        },
        Err(errors) => {
            debug!(id = movie.id, ?errors, "rejected edit");
            let (jar, token) = csrf::issue(jar);
            let body = templates::edit_page(EditView {
                movie: &movie,
                action,
                carry_title,
                csrf_token: &token,
                values: Some(form),
                errors: &errors,
            });
            Ok((StatusCode::UNPROCESSABLE_ENTITY, jar, Html(body)).into_response())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_id_requires_prefix() {
        assert_eq!(movie_id("id=12").unwrap(), 12);
        assert!(matches!(movie_id("12"), Err(AppError::NotFound(_))));
        assert!(matches!(movie_id("id=abc"), Err(AppError::NotFound(_))));
        assert!(matches!(movie_id("id="), Err(AppError::NotFound(_))));
    }

    #[test]
    fn external_id_must_be_numeric() {
        assert_eq!(parse_external_id("27205").unwrap(), 27205);
        assert!(matches!(parse_external_id("abc"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_external_id(""), Err(AppError::NotFound(_))));
    }

    #[test]
    fn paths_match_routes() {
        assert_eq!(edit_path(3), "/edit/id=3");
        assert_eq!(delete_path(3), "/delete/id=3");
        assert_eq!(add_path(27205), "/add/27205");
    }
}
