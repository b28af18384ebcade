use std::cell::{Cell, RefCell};
use std::future::ready;

use onrepeat::error::{SyncError, TransportError};
use onrepeat::paging::*;

// In-memory collection served one page at a time, recording every request
struct VecSource {
    items: Vec<String>,
    default_limit: u32,
    requests: RefCell<Vec<PageWindow>>,
}

impl VecSource {
    fn new(n: usize, default_limit: u32) -> Self {
        Self {
            items: (0..n).map(|i| format!("item{}", i)).collect(),
            default_limit,
            requests: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl PageSource for VecSource {
    type Item = String;

    async fn fetch_page(&self, window: PageWindow) -> Result<Page<String>, TransportError> {
        self.requests.borrow_mut().push(window);

        let offset = window.offset.unwrap_or(0);
        let limit = window.limit.unwrap_or(self.default_limit);
        let start = (offset as usize).min(self.items.len());
        let end = (start + limit as usize).min(self.items.len());

        Ok(Page::new(self.items[start..end].to_vec(), limit, offset))
    }
}

#[tokio::test]
async fn test_five_items_page_size_two() {
    let source = VecSource::new(5, 20);

    let items = fetch_all_from(&source, Some(2), Some(0)).await.unwrap();

    assert_eq!(items, source.items);
    assert_eq!(
        *source.requests.borrow(),
        vec![
            PageWindow::new(0, 2),
            PageWindow::new(2, 2),
            PageWindow::new(4, 2),
        ]
    );
}

#[tokio::test]
async fn test_returns_every_item_in_order() {
    for n in 0..=12 {
        for limit in 1..=5u32 {
            let source = VecSource::new(n, 20);
            let items = fetch_all_from(&source, Some(limit), Some(0)).await.unwrap();
            assert_eq!(items, source.items, "n={} limit={}", n, limit);
        }
    }
}

#[tokio::test]
async fn test_call_count_depends_on_last_page() {
    for n in 0..=12usize {
        for limit in 1..=5usize {
            let source = VecSource::new(n, 20);
            fetch_all_from(&source, Some(limit as u32), Some(0))
                .await
                .unwrap();

            let expected = if n % limit == 0 {
                n / limit + 1
            } else {
                n.div_ceil(limit)
            };
            assert_eq!(source.calls(), expected, "n={} limit={}", n, limit);
        }
    }
}

#[tokio::test]
async fn test_empty_collection_makes_one_call() {
    let source = VecSource::new(0, 50);

    let items = fetch_all_from(&source, None, None).await.unwrap();

    assert!(items.is_empty());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_limit_and_offset_inferred_from_first_page() {
    let source = VecSource::new(7, 3);

    let items = fetch_all_from(&source, None, None).await.unwrap();

    assert_eq!(items, source.items);
    assert_eq!(
        *source.requests.borrow(),
        vec![
            PageWindow::default(),
            PageWindow::new(3, 3),
            PageWindow::new(6, 3),
        ]
    );
}

#[tokio::test]
async fn test_starts_at_caller_offset() {
    let source = VecSource::new(6, 20);

    let items = fetch_all_from(&source, Some(2), Some(3)).await.unwrap();

    assert_eq!(items, source.items[3..].to_vec());
    assert_eq!(source.requests.borrow()[0], PageWindow::new(3, 2));
}

#[tokio::test]
async fn test_closure_fetch() {
    let data: Vec<u32> = (1..=9).collect();
    let calls = Cell::new(0);

    let items = fetch_all(
        |window: PageWindow| {
            calls.set(calls.get() + 1);
            let offset = window.offset.unwrap_or(0) as usize;
            let limit = window.limit.unwrap_or(4) as usize;
            let end = (offset + limit).min(data.len());
            ready(Ok(Page::new(
                data[offset.min(end)..end].to_vec(),
                limit as u32,
                offset as u32,
            )))
        },
        None,
        Some(0),
    )
    .await
    .unwrap();

    assert_eq!(items, data);
    assert_eq!(calls.get(), 3);
}

#[tokio::test]
async fn test_zero_limit_is_protocol_violation() {
    let calls = Cell::new(0);

    let result = fetch_all(
        |window: PageWindow| {
            calls.set(calls.get() + 1);
            ready(Ok(Page::<u32>::new(Vec::new(), 0, window.offset.unwrap_or(0))))
        },
        None,
        None,
    )
    .await;

    assert!(matches!(result, Err(SyncError::ProtocolViolation(_))));
    assert_eq!(calls.get(), 1);
}

#[tokio::test]
async fn test_oversized_page_is_protocol_violation() {
    let result = fetch_all(
        |_window: PageWindow| ready(Ok(Page::new(vec![1, 2, 3], 2, 0))),
        Some(2),
        Some(0),
    )
    .await;

    assert!(matches!(result, Err(SyncError::ProtocolViolation(_))));
}

#[tokio::test]
async fn test_failed_page_aborts_read() {
    let calls = Cell::new(0);

    let result = fetch_all(
        |window: PageWindow| {
            calls.set(calls.get() + 1);
            if calls.get() == 2 {
                ready(Err(TransportError::Remote("connection reset".to_string())))
            } else {
                ready(Ok(Page::new(vec![1, 2], 2, window.offset.unwrap_or(0))))
            }
        },
        Some(2),
        Some(0),
    )
    .await;

    assert!(matches!(
        result,
        Err(SyncError::Transport(TransportError::Remote(_)))
    ));
    assert_eq!(calls.get(), 2);
}
