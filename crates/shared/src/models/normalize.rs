use tokio::sync::mpsc;

use crate::errors::ConvertError;
use crate::models::dbf::{FieldValue, Row};
use crate::models::source::RowStream;

/// Trim leading and trailing spaces from every text field; other whitespace is kept
pub fn strip_row(row: &mut Row) {
    for value in row.iter_mut() {
        if let FieldValue::Character(text) = value {
            let trimmed = text.trim_matches(' ');
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
        }
    }
}

/// Interpose a relay task that strips text fields on their way through.
///
/// The relay has its own channel of `capacity` rows and its completion resolves to the
/// upstream scan summary once everything has been forwarded.
pub fn strip_rows(input: RowStream, capacity: usize) -> RowStream {
    let (sender, rows) = mpsc::channel(capacity.max(1));
    let (mut upstream, upstream_done) = input.into_parts();

    let completion = tokio::spawn(async move {
        while let Some(mut row) = upstream.recv().await {
            strip_row(&mut row);
            if sender.send(row).await.is_err() {
                log::debug!("Stripped row consumer hung up");
                break;
            }
        }
        drop(sender);
        // Hang up on the producer too, so it stops if we stopped early
        drop(upstream);
        upstream_done.await.map_err(ConvertError::from).and_then(|summary| summary)
    });

    RowStream { rows, completion }
}
