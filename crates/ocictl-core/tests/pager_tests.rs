//! Paginated collection through the public API and the identity fake

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::TryStreamExt;
use ocictl_core::instances::list_compartments;
use ocictl_core::testing::{FakeIdentity, compartment};
use ocictl_core::{CoreError, Page, Paginator};

/// Pages of the given sizes with chained cursors; items are numbered in order
fn sized_pages(sizes: &[usize]) -> Vec<Page<usize>> {
    let mut next = 0;
    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let items: Vec<usize> = (next..next + size).collect();
            next += size;
            let cursor = (i + 1 < sizes.len()).then(|| format!("c{}", i + 1));
            Page::new(items, cursor)
        })
        .collect()
}

fn fetch_from(
    pages: &[Page<usize>],
    cursor: Option<String>,
) -> Result<Page<usize>, CoreError> {
    let index = match cursor {
        None => 0,
        Some(c) => c.trim_start_matches('c').parse::<usize>().map_err(|_| {
            CoreError::remote(format!("bad cursor {c}"))
        })?,
    };
    pages
        .get(index)
        .cloned()
        .ok_or_else(|| CoreError::remote("cursor past the end"))
}

#[tokio::test]
async fn collects_a_plus_b_plus_c_items_in_order() {
    for sizes in [vec![3, 0, 2], vec![1], vec![0], vec![5, 5, 5, 1]] {
        let pages = sized_pages(&sizes);
        let calls = AtomicUsize::new(0);
        let paginator = Paginator::new(|cursor| {
            calls.fetch_add(1, Ordering::SeqCst);
            let result = fetch_from(&pages, cursor);
            async move { result }
        });

        let items = paginator.collect().await.unwrap();

        let total: usize = sizes.iter().sum();
        assert_eq!(items, (0..total).collect::<Vec<_>>());
        assert_eq!(calls.load(Ordering::SeqCst), sizes.len(), "each page fetched once");
    }
}

#[tokio::test]
async fn failing_page_discards_partial_results() {
    let pages = sized_pages(&[2, 2, 2]);
    let paginator = Paginator::new(|cursor: Option<String>| {
        let result = match cursor.as_deref() {
            Some("c2") => Err(CoreError::remote("InternalServerError")),
            _ => fetch_from(&pages, cursor),
        };
        async move { result }
    });

    let err = paginator.collect().await.unwrap_err();
    assert!(matches!(err, CoreError::Remote { .. }));

    // The lazy stream yields what it has before surfacing the error
    let mut stream = std::pin::pin!(paginator.items());
    assert_eq!(stream.try_next().await.unwrap(), Some(0));
    assert_eq!(stream.try_next().await.unwrap(), Some(1));
    assert_eq!(stream.try_next().await.unwrap(), Some(2));
    assert_eq!(stream.try_next().await.unwrap(), Some(3));
    assert!(stream.try_next().await.is_err());
}

#[tokio::test]
async fn compartment_listing_is_all_or_nothing() {
    let identity = FakeIdentity::new()
        .with_compartment(compartment("ocid1.tenancy.oc1..root", "root", None))
        .with_compartment_pages(vec![
            vec![compartment("ocid1.compartment.oc1..a", "a", Some("ocid1.tenancy.oc1..root"))],
            vec![compartment("ocid1.compartment.oc1..b", "b", Some("ocid1.tenancy.oc1..root"))],
        ])
        .with_failing_page(1);

    let err = list_compartments(&identity, "ocid1.tenancy.oc1..root")
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Remote { .. }));
    assert_eq!(identity.list_calls(), 2);
}
