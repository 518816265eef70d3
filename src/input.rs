use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Buffer every line of `reader` until EOF. `\n` and `\r\n` are removed.
pub async fn read_lines<R: AsyncRead + Unpin>(reader: R) -> Result<Vec<String>> {
    let mut lines = BufReader::new(reader).lines();
    let mut buffered = Vec::new();
    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("reading line {}", buffered.len() + 1))?
    {
        buffered.push(line);
    }
    Ok(buffered)
}
