use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    csrf,
    entities::movie,
    forms::{EditForm, FieldErrors},
    models::MovieSummary,
    routes,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub fn index_page(movies: &[movie::Model]) -> String {
    page(
        "My Top Movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-4xl mx-auto px-6 py-12" {
                    div class="flex items-start justify-between gap-6" {
                        div {
                            h1 class="text-3xl font-bold text-gray-900" { "My Top Movies" }
                            p class="mt-2 text-gray-600" { "These are my all-time favourite movies." }
                        }
                        a class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/add" { "Add movie" }
                    }

                    @if movies.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "Nothing here yet. Add a movie to get started." }
                        }
                    } @else {
                        div class="mt-10 space-y-4" {
                            @for movie in movies {
                                (movie_card(movie))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn add_page(csrf_token: &str, title: &str, errors: &FieldErrors) -> String {
    page(
        "Add Movie",
        narrow(html! {
            h1 class="text-3xl font-bold text-gray-900" { "Add a Movie" }
            form class="mt-8 space-y-6" method="post" action="/add" novalidate {
                (csrf_field(csrf_token))
                div {
                    label class="block text-sm font-medium text-gray-700" for="title" { "Movie Title" }
                    input class=(INPUT_CLASS) name="title" id="title" value=(title) required;
                    (field_error(errors, "title"))
                }
                button class=(BUTTON_CLASS) type="submit" { "Add Movie" }
            }
        }),
    )
}

pub fn select_page(query: &str, results: &[MovieSummary]) -> String {
    page(
        "Select Movie",
        narrow(html! {
            h1 class="text-3xl font-bold text-gray-900" { "Select Movie" }
            p class="mt-2 text-gray-600" { "Results for \u{201c}" (query) "\u{201d}" }

            @if results.is_empty() {
                p class="mt-8 text-gray-600" { "No movies matched that title." }
            } @else {
                ul class="mt-8 divide-y divide-gray-200" {
                    @for result in results {
                        li class="py-3" {
                            a class="text-blue-600 hover:text-blue-800" href=(routes::add_path(result.id)) {
                                (display_title(result))
                            }
                            @if let Some(date) = result.release_date.as_deref().filter(|d| !d.is_empty()) {
                                span class="ml-2 text-sm text-gray-500" { "(" (date) ")" }
                            }
                        }
                    }
                }
            }
            a class="mt-8 inline-block text-sm text-blue-600 hover:text-blue-800" href="/add" { "Search again" }
        }),
    )
}

/// What the edit page needs besides the movie itself.
pub struct EditView<'a> {
    pub movie: &'a movie::Model,
    pub action: &'a str,
    /// Sends the movie title back with the form; used by the add flow.
    pub carry_title: bool,
    pub csrf_token: &'a str,
    pub values: Option<&'a EditForm>,
    pub errors: &'a FieldErrors,
}

pub fn edit_page(view: EditView<'_>) -> String {
    let movie = view.movie;
    let rating = match view.values {
        Some(values) => values.rating.clone(),
        None => movie.rating.map(|r| r.to_string()).unwrap_or_default(),
    };
    let review = match view.values {
        Some(values) => values.review.clone(),
        None => movie.review.clone().unwrap_or_default(),
    };

    page(
        "Edit Movie",
        narrow(html! {
            h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
            p class="mt-2 text-gray-600" { "Edit Movie Rating" }

            form class="mt-8 space-y-6" method="post" action=(view.action) novalidate {
                (csrf_field(view.csrf_token))
                @if view.carry_title {
                    input type="hidden" name="title" value=(movie.title);
                }
                div {
                    label class="block text-sm font-medium text-gray-700" for="rating" { "Your Rating out of 10 e.g. 7.5" }
                    input class=(INPUT_CLASS) name="rating" id="rating" inputmode="decimal" value=(rating) required;
                    (field_error(view.errors, "rating"))
                }
                div {
                    label class="block text-sm font-medium text-gray-700" for="review" { "Your Review" }
                    input class=(INPUT_CLASS) name="review" id="review" value=(review) required;
                    (field_error(view.errors, "review"))
                }
                button class=(BUTTON_CLASS) type="submit" { "Done" }
            }
        }),
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let heading = status.canonical_reason().unwrap_or("Error");
    page(
        heading,
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { (heading) }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn narrow(inner: Markup) -> Markup {
    html! {
        div class="min-h-screen bg-gray-50" {
            div class="max-w-2xl mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" { (inner) }
            }
        }
    }
}

fn csrf_field(token: &str) -> Markup {
    html! { input type="hidden" name=(csrf::FIELD_NAME) value=(token); }
}

fn field_error(errors: &FieldErrors, field: &str) -> Markup {
    html! {
        @if let Some(message) = errors.get(field) {
            p class="mt-2 text-sm text-red-600" { (message) }
        }
    }
}

fn display_title(result: &MovieSummary) -> &str {
    if result.title.is_empty() { &result.original_title } else { &result.title }
}

fn movie_card(movie: &movie::Model) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-6" {
            @if let Some(img_url) = &movie.img_url {
                img class="w-24 rounded" src=(img_url) alt=(movie.title);
            }
            div class="flex-1" {
                div class="flex items-start justify-between gap-4" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        @if let Some(ranking) = movie.ranking {
                            span class="mr-2 text-gray-400" { "#" (ranking) }
                        }
                        (movie.title)
                        @if let Some(year) = movie.year {
                            span class="ml-2 font-normal text-gray-500" { "(" (year) ")" }
                        }
                    }
                    span class="text-lg font-semibold text-gray-700" {
                        @match movie.rating {
                            Some(rating) => { (format!("{rating:.1}")) " / 10" },
                            None => { "Not rated" },
                        }
                    }
                }
                @if let Some(review) = &movie.review {
                    p class="mt-2 italic text-gray-700" { "\u{201c}" (review) "\u{201d}" }
                }
                p class="mt-2 text-sm text-gray-600" { (movie.description) }
                div class="mt-4 flex gap-4 text-sm" {
                    a class="text-blue-600 hover:text-blue-800" href=(routes::edit_path(movie.id)) { "Update" }
                    a class="text-red-600 hover:text-red-800" href=(routes::delete_path(movie.id)) { "Delete" }
                }
            }
        }
    }
}
