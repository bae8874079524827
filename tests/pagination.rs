//! Lazy pagination through `TableService::list_all`.

mod common;

use common::{page_body, person_row, person_service, MockTransport};
use rowgrid::Value;

#[tokio::test]
async fn pager_walks_every_page_in_order() {
    let transport = MockTransport::new();
    let service = person_service(transport.clone());

    // 250 rows split across three server pages of 100/100/50.
    for (page, len) in [(0u64, 100u64), (1, 100), (2, 50)] {
        let rows = (0..len)
            .map(|i| {
                let index = page * 100 + i;
                person_row(index + 1, &format!("P{index}"), "30")
            })
            .collect();
        transport.enqueue(200, page_body(250, page < 2, rows));
    }

    let rows = service.list_all(None, Vec::new()).collect_all().await.unwrap();

    assert_eq!(rows.len(), 250);
    assert_eq!(transport.request_count(), 3);
    for (expected_page, request) in transport.requests().iter().enumerate() {
        assert_eq!(
            request.query_value("page"),
            Some((expected_page + 1).to_string().as_str())
        );
        assert_eq!(request.query_value("size"), Some("100"));
    }
    // Rows come out in server order across page boundaries.
    assert_eq!(rows[0].get("name"), Some(&Value::text("P0")));
    assert_eq!(rows[99].get("name"), Some(&Value::text("P99")));
    assert_eq!(rows[100].get("name"), Some(&Value::text("P100")));
    assert_eq!(rows[249].get("name"), Some(&Value::text("P249")));
}

#[tokio::test]
async fn pager_stops_fetching_when_dropped_early() {
    let transport = MockTransport::new();
    let service = person_service(transport.clone());
    transport.enqueue(
        200,
        page_body(
            250,
            true,
            (0..100).map(|i| person_row(i + 1, &format!("P{i}"), "30")).collect(),
        ),
    );

    let mut pager = service.list_all(None, Vec::new());
    let first = pager.next().await.unwrap().unwrap();
    assert_eq!(first.get("name"), Some(&Value::text("P0")));
    drop(pager);

    // Only the first page was ever requested.
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn pager_over_an_empty_table_yields_nothing() {
    let transport = MockTransport::new();
    let service = person_service(transport.clone());
    transport.enqueue(200, page_body(0, false, vec![]));

    let mut pager = service.list_all(None, Vec::new());
    assert!(pager.next().await.unwrap().is_none());
    assert!(pager.next().await.unwrap().is_none());
    assert_eq!(transport.request_count(), 1);
}
