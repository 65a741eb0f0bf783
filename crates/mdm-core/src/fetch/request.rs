//! One HTTP GET streamed into a temp file.

use std::cell::Cell;
use std::io;
use std::time::Duration;

use super::{FetchError, RequestOptions};
use crate::progress::ProgressTracker;
use crate::storage::PartialFile;

/// Why the write callback stopped the transfer.
enum Stop {
    ErrorStatus,
    RangeIgnored,
    Write(io::Error),
}

/// Performs a GET for `url`, optionally restricted to `range` (libcurl range
/// spec, e.g. `400-` or `0-1023`), appending the body to `file` and crediting
/// every written byte to `progress`. Returns the number of bytes written.
///
/// The body is handed over in libcurl receive-buffer sized pieces, so memory
/// use does not depend on the fragment size. Bodies of error responses are
/// never written.
pub(super) fn perform_get(
    url: &str,
    opts: &RequestOptions,
    range: Option<&str>,
    file: &mut PartialFile,
    progress: &ProgressTracker,
) -> Result<u64, FetchError> {
    let curl_err = |source: curl::Error| FetchError::Curl {
        url: url.to_string(),
        source,
    };

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_err)?;
    easy.follow_location(true).map_err(curl_err)?;
    easy.max_redirections(10).map_err(curl_err)?;
    easy.connect_timeout(Duration::from_secs(30)).map_err(curl_err)?;
    // Abort if throughput drops below 1 KiB/s for 60s instead of a wall-clock
    // limit, so large fragments on slow links are not killed.
    easy.low_speed_limit(1024).map_err(curl_err)?;
    easy.low_speed_time(Duration::from_secs(60)).map_err(curl_err)?;
    if let Some(sz) = opts.buffer_bytes {
        easy.buffer_size(sz).map_err(curl_err)?;
    }
    if !opts.user_agent.is_empty() {
        easy.useragent(&opts.user_agent).map_err(curl_err)?;
    }
    if let Some(r) = range {
        easy.range(r).map_err(curl_err)?;
    }

    let mut list = curl::easy::List::new();
    if !opts.referer.is_empty() {
        list.append(&format!("Referer: {}", opts.referer.trim()))
            .map_err(curl_err)?;
    }
    easy.http_headers(list).map_err(curl_err)?;

    // Status of the response currently being received; redirects reset it.
    let status = Cell::new(0u32);
    let mut written = 0u64;
    let mut stop: Option<Stop> = None;

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|line| {
                if let Some(code) = parse_status_line(line) {
                    status.set(code);
                }
                true
            })
            .map_err(curl_err)?;
        transfer
            .write_function(|data| {
                let code = status.get();
                if code >= 400 {
                    stop = Some(Stop::ErrorStatus);
                    return Ok(0);
                }
                if range.is_some() && code == 200 {
                    stop = Some(Stop::RangeIgnored);
                    return Ok(0);
                }
                match file.write_all(data) {
                    Ok(()) => {
                        written += data.len() as u64;
                        progress.add(data.len() as u64);
                        Ok(data.len())
                    }
                    Err(e) => {
                        stop = Some(Stop::Write(e));
                        Ok(0) // abort transfer
                    }
                }
            })
            .map_err(curl_err)?;
        transfer.perform()
    };

    let code = match easy.response_code() {
        Ok(code) => code,
        Err(e) => return Err(curl_err(e)),
    };
    if code >= 400 {
        return Err(FetchError::Http {
            url: url.to_string(),
            status: code,
        });
    }
    match stop {
        Some(Stop::Write(source)) => {
            return Err(FetchError::Io {
                path: file.temp_path().to_path_buf(),
                source,
            })
        }
        Some(Stop::RangeIgnored) => {
            return Err(FetchError::RangeIgnored {
                url: url.to_string(),
            })
        }
        Some(Stop::ErrorStatus) => {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.get(),
            })
        }
        None => {}
    }
    perform_result.map_err(curl_err)?;
    Ok(written)
}

/// Status code from an `HTTP/x yyy ...` header line, if `line` is one.
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
