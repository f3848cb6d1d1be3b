use std::io::Write;

use intentrank_core::types::{BackoffPlan, RankRequest};
use intentrank_hybrid::{ActionHint, IntentLocator, IntentQueries};
use intentrank_knowledge::ChunkKind;

const LOGIN_PAGE: &str = r#"<html><head><title>Swag Labs</title></head><body>
<div class="login_wrapper">
  <form id="login-form">
    <input class="input_error form_input" placeholder="Username" type="text" id="user-name" name="user-name" value="">
    <input class="input_error form_input" placeholder="Password" type="password" id="password" name="password" value="">
    <input type="submit" class="submit-button btn_action" id="login-button" name="login-button" value="Login">
  </form>
</div></body></html>"#;

const KNOWLEDGE: &str = r#"## 1) Table Schemas
### 1.1) `FLIGHT_SCHEDULES`
| FS_FLIGHT_NO | VARCHAR2 |
| FS_DEP_STATION | VARCHAR2 |

### Table: CREW_ROSTER
crew per flight

## 2) Queries
```sql
-- open flights today
SELECT * FROM FLIGHT_SCHEDULES WHERE TRUNC(FS_FLIGHT_STA_STD) = TRUNC(SYSDATE)
```

```
SELECT COUNT(*) FROM CREW_ROSTER
```

## 3) Relationships
1) FLIGHT_SCHEDULES.FS_FLIGHT_NO joins CREW_ROSTER.FLIGHT_NO
"#;

#[test]
fn rank_elements_reports_element_fields() {
    let locator = IntentLocator::new();
    let ranked = locator
        .rank_elements(LOGIN_PAGE, &RankRequest::new("type your password").with_top_k(3))
        .unwrap();
    assert_eq!(ranked.len(), 3);
    let top = &ranked[0];
    assert_eq!(top.tag, "input");
    assert_eq!(top.id.as_deref(), Some("password"));
    assert_eq!(top.classes, Some(vec!["input_error".to_string(), "form_input".to_string()]));
    assert!(top.outer_html.starts_with("<input"));
    assert_eq!(top.score, (top.score * 1e6).round() / 1e6);

    let json = serde_json::to_value(top).unwrap();
    assert!(json.get("outerHTML").is_some());

    let title = locator
        .rank_elements(LOGIN_PAGE, &RankRequest::new("swag labs title").with_top_k(1))
        .unwrap();
    assert_eq!(title[0].tag, "title");
    assert_eq!(title[0].id, None);
    assert_eq!(title[0].classes, None);
    assert_eq!(title[0].text, "Swag Labs");
}

#[test]
fn outer_html_from_a_file_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(LOGIN_PAGE.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let locator = IntentLocator::new();
    let found = locator
        .find_outer_html(&path, &RankRequest::new("click the login button").with_locator("#login-btn"))
        .unwrap();
    assert!(!found.is_empty());
    assert!(found[0].contains(r#"id="login-button""#));
}

#[test]
fn backoff_facade_relaxes_until_something_matches() {
    let locator = IntentLocator::new();
    let plan = BackoffPlan { start: 5.0, floor: 0.0, step: 0.5 };
    let found = locator
        .find_outer_html_with_backoff(LOGIN_PAGE, &RankRequest::new("Enter the username"), &plan)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].contains(r#"id="user-name""#));

    let none = locator
        .rank_elements_with_backoff(LOGIN_PAGE, &RankRequest::new("zzz qqq"), &BackoffPlan::default())
        .unwrap();
    assert_eq!(none.len(), 5);
    assert!(none.iter().all(|e| e.score == 0.0));
}

#[test]
fn knowledge_sections_rank_independently() {
    let queries = IntentQueries::new();
    let matches = queries.rank_all(KNOWLEDGE, &RankRequest::new("open flights today").with_top_k(1));
    assert_eq!(matches.queries.len(), 1);
    assert_eq!(matches.queries[0].label, "-- open flights today");
    assert_eq!(matches.queries[0].kind, ChunkKind::Query);
    assert_eq!(matches.schemas.len(), 1);
    assert_eq!(matches.relationships.len(), 1);

    let crew = queries.rank_schemas(KNOWLEDGE, &RankRequest::new("crew roster element"));
    assert_eq!(crew[0].label, "CREW_ROSTER");

    let json = serde_json::to_value(&matches).unwrap();
    assert_eq!(json["queries"][0]["type"], "query");
}

#[test]
fn knowledge_min_score_filters_chunks() {
    let ranked = IntentQueries::new().rank_schemas(KNOWLEDGE, &RankRequest::new("zzzz").with_min_score(0.01));
    assert!(ranked.is_empty());
}

#[test]
fn action_hint_drives_top_k() {
    assert_eq!(ActionHint::guess("Then I should see the error").top_k(), 10);
    assert_eq!(ActionHint::guess("I navigate to the shop").top_k(), 0);
}
