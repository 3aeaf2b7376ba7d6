use axum::{
    Form,
    body::Body,
    extract::{FromRequest, Request},
    http::header,
};
use chrono::{TimeZone, Utc};
use recipebook::{
    models::{MAX_TITLE_LEN, Recipe, RecipeForm, RecipeStatus, ValidationError},
    views::{self, Page},
};
use uuid::Uuid;

fn form(title: &str, status: &str) -> RecipeForm {
    RecipeForm {
        title: title.to_string(),
        ingredients: "2 eggs\n1 cup milk".to_string(),
        instructions: "Whisk everything.".to_string(),
        status: status.to_string(),
    }
}

// --- Form validation ---

#[test]
fn test_valid_form_trims_title_and_keeps_text() {
    let draft = form("  Pancakes  ", "private").validate().unwrap();

    assert_eq!(draft.title, "Pancakes");
    assert_eq!(draft.status, RecipeStatus::Private);
    // Ingredients and instructions are free text, stored untouched.
    assert_eq!(draft.ingredients, "2 eggs\n1 cup milk");
    assert_eq!(draft.instructions, "Whisk everything.");
}

#[test]
fn test_blank_title_rejected() {
    for title in ["", "   ", "\t\n"] {
        assert_eq!(
            form(title, "public").validate(),
            Err(ValidationError::MissingTitle)
        );
    }
}

#[test]
fn test_title_length_limit_counts_characters() {
    let at_limit = "é".repeat(MAX_TITLE_LEN);
    assert!(form(&at_limit, "public").validate().is_ok());

    let over = "a".repeat(MAX_TITLE_LEN + 1);
    assert_eq!(
        form(&over, "public").validate(),
        Err(ValidationError::TitleTooLong {
            len: MAX_TITLE_LEN + 1,
            max: MAX_TITLE_LEN
        })
    );
}

#[test]
fn test_status_defaults_to_public_when_missing() {
    let draft = form("Soup", "").validate().unwrap();
    assert_eq!(draft.status, RecipeStatus::Public);
}

#[test]
fn test_unknown_status_rejected() {
    assert_eq!(
        form("Soup", "friends").validate(),
        Err(ValidationError::InvalidStatus)
    );
}

#[tokio::test]
async fn test_form_ignores_injected_owner_field() {
    let request = Request::builder()
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "title=Stew&status=public&user=00000000-0000-0000-0000-000000000001&_method=PUT",
        ))
        .unwrap();

    let Form(parsed) = Form::<RecipeForm>::from_request(request, &()).await.unwrap();
    assert_eq!(parsed.title, "Stew");
    // Missing fields fall back to empty text.
    assert_eq!(parsed.ingredients, "");
}

// --- Status ---

#[test]
fn test_status_parse_and_serde() {
    assert_eq!(RecipeStatus::parse("public"), Some(RecipeStatus::Public));
    assert_eq!(RecipeStatus::parse(" Private "), Some(RecipeStatus::Private));
    assert_eq!(RecipeStatus::parse("draft"), None);

    assert_eq!(
        serde_json::to_string(&RecipeStatus::Private).unwrap(),
        "\"private\""
    );
    let status: RecipeStatus = serde_json::from_str("\"public\"").unwrap();
    assert_eq!(status, RecipeStatus::Public);
    assert_eq!(RecipeStatus::default(), RecipeStatus::Public);
}

#[test]
fn test_recipe_prefills_edit_form() {
    let recipe = Recipe {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        title: "Chili".to_string(),
        ingredients: "beans".to_string(),
        instructions: "Simmer.".to_string(),
        status: RecipeStatus::Private,
        created_at: Utc::now(),
    };

    let prefilled = RecipeForm::from(&recipe);
    assert_eq!(prefilled.title, "Chili");
    assert_eq!(prefilled.status, "private");
    assert_eq!(prefilled.validate().unwrap().status, RecipeStatus::Private);
}

// --- View helpers ---

#[test]
fn test_escape_html() {
    assert_eq!(
        views::escape(r#"<a href="x">Tom & Jerry's</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
    );
    assert_eq!(views::escape("plain"), "plain");
}

#[test]
fn test_truncate_cuts_at_word_boundary() {
    assert_eq!(views::truncate("short text", 50), "short text");
    assert_eq!(
        views::truncate("the quick brown fox jumps", 12),
        "the quick..."
    );
    // A single long word is cut mid-word.
    assert_eq!(views::truncate("abcdefghij", 4), "abcd...");
}

#[test]
fn test_format_date() {
    let at = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
    assert_eq!(views::format_date(&at), "March 7, 2024");
}

#[test]
fn test_page_status_codes() {
    assert_eq!(Page::NotFound.status(), 404);
    assert_eq!(Page::ServerError.status(), 500);
    assert_eq!(
        Page::AddRecipe {
            form: RecipeForm::default(),
            error: None
        }
        .status(),
        200
    );
    assert_eq!(
        Page::AddRecipe {
            form: RecipeForm::default(),
            error: Some("Please add a title".to_string())
        }
        .status(),
        422
    );
}
