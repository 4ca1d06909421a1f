use super::*;

fn draft(title: &str, start: &str, end: &str) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        description: "description".to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
        total_guests: 4,
    }
}

fn image(name: &str) -> ImageUpload {
    ImageUpload::new(name, vec![1, 2, 3])
}

#[tokio::test]
async fn lists_events_sorted_and_paginated() {
    let api = InMemoryEventsApi::new();
    for title in ["Charlie", "alpha", "Bravo"] {
        api.create_event(&draft(title, "2024-01-01", "2024-01-02"), vec![image("a.png")])
            .await
            .expect("create");
    }

    let first = api
        .list_events(&ListEventsQuery {
            limit: 2,
            ..ListEventsQuery::default()
        })
        .await
        .expect("list");
    let titles: Vec<_> = first.events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["alpha", "Bravo"]);
    assert_eq!(first.total, 3);

    let second = api
        .list_events(&ListEventsQuery {
            page: 2,
            limit: 2,
            order: SortOrder::Desc,
            ..ListEventsQuery::default()
        })
        .await
        .expect("list");
    let titles: Vec<_> = second.events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["alpha"]);
}

#[tokio::test]
async fn update_appends_images_and_keeps_id() {
    let api = InMemoryEventsApi::new();
    let created = api
        .create_event(&draft("Launch", "2024-01-01", "2024-01-02"), vec![image("a.png")])
        .await
        .expect("create");

    let updated = api
        .update_event(
            created.id,
            &draft("Launch v2", "2024-01-01", "2024-01-03"),
            vec![image("b.png")],
        )
        .await
        .expect("update");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Launch v2");
    assert_eq!(updated.images.len(), 2);
}

#[tokio::test]
async fn missing_records_report_not_found() {
    let api = InMemoryEventsApi::new();
    let err = api.delete_event(EventId(99)).await.expect_err("missing");
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    let err = api
        .update_event(EventId(99), &draft("x", "2024-01-01", "2024-01-01"), Vec::new())
        .await
        .expect_err("missing");
    assert_eq!(err.operation(), Some(EventOperation::Update));
}

#[tokio::test]
async fn unparseable_dates_are_rejected_as_bad_request() {
    let api = InMemoryEventsApi::new();
    let err = api
        .create_event(&draft("x", "soon", "2024-01-01"), Vec::new())
        .await
        .expect_err("bad date");
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert!(api.is_empty().await);
}

#[tokio::test]
async fn sample_events_fill_more_than_one_page() {
    let api = InMemoryEventsApi::with_sample_events();
    let page = api
        .list_events(&ListEventsQuery::default())
        .await
        .expect("list");
    assert_eq!(page.events.len(), 10);
    assert!(page.total > 10);
    assert!(page.events.iter().all(|event| event.images.len() == 1));
}
