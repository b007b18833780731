//! Bulk import of exported posts into the metadata store

use indicatif::{ProgressBar, ProgressStyle};
use postsearch_common::{Result, SearchError};
use postsearch_store::{encode_tags, PostRecord, RedisPostStore};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

/// Counts reported after a load
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub posts: usize,
    pub batches: usize,
}

/// Stream a JSON Lines file of posts into Redis, `batch_size` per pipeline.
pub async fn load_posts(store: &RedisPostStore, input: &Path, batch_size: usize) -> Result<LoadSummary> {
    if batch_size == 0 {
        return Err(SearchError::invalid_argument("Batch size must be greater than 0"));
    }

    let file = tokio::fs::File::open(input).await?;
    let total_bytes = file.metadata().await?.len();
    let progress = ProgressBar::new(total_bytes);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut reader = BufReader::new(file);
    let mut line = String::new();
    let mut batch = Vec::with_capacity(batch_size);
    let mut summary = LoadSummary::default();
    let mut line_no = 0;

    while let Some(consumed) = read_next_line(&mut reader, &mut line).await? {
        line_no += 1;
        progress.inc(consumed);

        if let Some(record) = parse_line(line_no, &line)? {
            batch.push(record);
        }
        if batch.len() >= batch_size {
            summary.posts += store.store_many(&batch).await?;
            summary.batches += 1;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        summary.posts += store.store_many(&batch).await?;
        summary.batches += 1;
    }

    progress.finish_with_message("Load complete");
    info!(
        "Loaded {} posts in {} batches from {}",
        summary.posts,
        summary.batches,
        input.display()
    );
    Ok(summary)
}

/// Read the next line into `buf`, returning the bytes consumed including
/// the terminator, or `None` at end of input.
async fn read_next_line<R: AsyncBufRead + Unpin>(reader: &mut R, buf: &mut String) -> Result<Option<u64>> {
    buf.clear();
    let consumed = reader.read_line(buf).await?;
    if consumed == 0 {
        return Ok(None);
    }
    Ok(Some(consumed as u64))
}

/// Parse one line; blank lines are skipped.
fn parse_line(line_no: usize, line: &str) -> Result<Option<PostRecord>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let record: PostRecord = serde_json::from_str(line).map_err(|e| {
        SearchError::invalid_argument(format!("Line {}: invalid post record: {}", line_no, e))
    })?;

    if record.id.trim().is_empty() {
        return Err(SearchError::invalid_argument(format!(
            "Line {}: post id cannot be empty",
            line_no
        )));
    }
    encode_tags(&record.post.tags)
        .map_err(|e| SearchError::invalid_argument(format!("Line {}: {}", line_no, e)))?;

    Ok(Some(record))
}
