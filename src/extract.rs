//! Recovering a bounded HTML document from generated text

use log::{debug, trace};

const DOCTYPE_OPEN: &str = "<!doctype html>";
const DOCTYPE_PREFIX: &str = "<!doctype";
const HTML_OPEN: &str = "<html";
const HTML_CLOSE: &str = "</html>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractResult
{   Found
    {   html: String
    }
  , NotFound
}

impl ExtractResult
{   pub fn into_html(self) -> Option<String>
    {   match self
        {   ExtractResult::Found { html } => Some(html)
          , ExtractResult::NotFound => None
        }
    }
}

/// Classify `raw` as holding a document or not. Never fails.
///
/// A `<!doctype html>` followed by `</html>` yields exactly that span.
/// Otherwise the earliest `<!doctype` or `<html` marker is taken up to
/// the last `</html>` after it, or to the end of the text when the
/// document is unterminated. Matching ignores ASCII case and the
/// result is trimmed.
pub fn extract(raw: &str) -> ExtractResult
{   // ASCII lowering keeps byte offsets aligned with `raw`
    let lowered = raw.to_ascii_lowercase();

    if let Some(open) = lowered.find(DOCTYPE_OPEN)
    {   if let Some(close) = lowered[open..].find(HTML_CLOSE)
        {   let end = open + close + HTML_CLOSE.len();
            trace!("Bounded document at {}..{}", open, end);
            return found(&raw[open..end]);
        }
    }

    let open = [DOCTYPE_PREFIX, HTML_OPEN]
      .iter()
      .filter_map(|marker| lowered.find(*marker))
      .min();

    match open
    {   Some(open) => {
          let end = lowered[open..]
            .rfind(HTML_CLOSE)
            .map(|close| open + close + HTML_CLOSE.len())
            .unwrap_or(raw.len());
          if end == raw.len()
          {   debug!("Document close marker missing, keeping tail");
          }
          found(&raw[open..end])
        }
      , None => {
          debug!("No document marker in {} bytes", raw.len());
          ExtractResult::NotFound
        }
    }
}

fn found(html: &str) -> ExtractResult
{   ExtractResult::Found
    {   html: html.trim().to_string()
    }
}

/// Gate applied before accepting extracted text as a document
pub fn is_valid_document(html: &str) -> bool
{   let head = html.trim_start();
    starts_with_ignore_case(head, DOCTYPE_PREFIX)
      || starts_with_ignore_case(head, HTML_OPEN)
}

/// Extract then gate, as the chain does for model output
pub fn accept(raw: &str) -> Result<String, crate::error::Error>
{   let html = extract(raw)
      .into_html()
      .ok_or(crate::error::Error::ExtractionNotFound)?;
    if is_valid_document(&html)
    {   Ok(html)
    } else
    {   let preview: String = html.chars().take(40).collect();
        Err(crate::error::Error::ValidationFailed(preview))
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool
{   text.len() >= prefix.len()
      && text.as_bytes()[..prefix.len()]
        .eq_ignore_ascii_case(prefix.as_bytes())
}
