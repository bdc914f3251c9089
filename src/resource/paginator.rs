//! Listing pagination
//!
//! Drives multi-page listing loops until the API stops reporting a next
//! page, accumulating items with set-union semantics: duplicates across
//! overlapping pages are collapsed by deep-value equality, in first-seen
//! order.

use crate::api::client::DoClient;
use crate::error::{SyncError, SyncResult};
use crate::resource::registry::ListSource;
use serde_json::Value;

/// Items requested per listing page.
pub const PAGE_SIZE: u32 = 200;

/// Upper bound on pages fetched from one source. The API signals the
/// final page by omitting `links.pages.next`; the cap bounds a
/// misbehaving upstream that never clears it.
pub const MAX_PAGES: u32 = 1000;

/// Cursor state for one in-flight listing loop. Created at page 1 and
/// dropped when the loop exits.
#[derive(Debug, Clone, Copy)]
struct PageCursor {
    page_number: u32,
    has_next: bool,
}

/// Fetch every item from a listing source.
///
/// Pages are fetched strictly in sequence. A failed page aborts the whole
/// listing; partial results are discarded by the caller.
pub async fn fetch_all(client: &DoClient, source: &ListSource) -> SyncResult<Vec<Value>> {
    let mut items: Vec<Value> = Vec::new();

    if !source.paginated {
        tracing::debug!(path = %source.path, "fetching unpaginated listing");
        let response = client.get(&source.path).await?;
        collect_page(&mut items, &response, source);
        return Ok(items);
    }

    let mut cursor = PageCursor {
        page_number: 1,
        has_next: true,
    };

    while cursor.has_next {
        if cursor.page_number > MAX_PAGES {
            return Err(SyncError::PageLimitExceeded { pages: MAX_PAGES });
        }

        tracing::debug!(path = %source.path, page = cursor.page_number, "fetching listing page");
        let response = client
            .get_list(&source.path, cursor.page_number, PAGE_SIZE)
            .await?;
        collect_page(&mut items, &response, source);

        cursor.has_next = has_next_page(&response);
        if cursor.has_next {
            cursor.page_number += 1;
        }
    }

    Ok(items)
}

/// `links.pages.next` presence signals another page.
fn has_next_page(response: &Value) -> bool {
    response
        .pointer("/links/pages/next")
        .is_some_and(|v| !v.is_null())
}

/// Extract one page's items, apply the source's static injections, and
/// union them into the accumulator.
fn collect_page(items: &mut Vec<Value>, response: &Value, source: &ListSource) {
    let Some(page_items) = response.get(&source.items_field).and_then(Value::as_array) else {
        return;
    };

    tracing::debug!(count = page_items.len(), field = %source.items_field, "collected page items");

    let injected = page_items.iter().map(|item| {
        let mut item = item.clone();
        if let Value::Object(ref mut map) = item {
            for (key, value) in &source.inject {
                map.insert(key.clone(), value.clone());
            }
        }
        item
    });

    union_extend(items, injected);
}

/// Append items not already present (deep-value equality), preserving
/// first-seen order.
pub fn union_extend(items: &mut Vec<Value>, new_items: impl IntoIterator<Item = Value>) {
    for item in new_items {
        if !items.contains(&item) {
            items.push(item);
        }
    }
}
