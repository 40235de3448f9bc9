//! Background meme fetch for the meme cart.
//!
//! Each fetch gets its own thread with a current-thread tokio runtime. The
//! result always arrives on the channel: a failed fetch sends a placeholder.

use crate::config::MemeSettings;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Meme {
    pub(crate) title: String,
    pub(crate) lines: Vec<String>,
    pub(crate) placeholder: bool,
}

impl Meme {
    pub(crate) fn placeholder() -> Self {
        Self {
            title: "UNDERTALE".to_string(),
            lines: vec!["YELLOW".to_string(), "MEME".to_string(), "*".to_string()],
            placeholder: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MemeResp {
    title: Option<String>,
    url: Option<String>,
    text: Option<String>,
    subreddit: Option<String>,
}

/// Turns an API body into a card. Accepts `{title, url}` or `{text}`.
pub(crate) fn parse_meme(body: &str) -> Result<Meme> {
    let r: MemeResp = serde_json::from_str(body).context("meme JSON parse failed")?;
    let mut lines = Vec::new();
    if let Some(sub) = r.subreddit {
        lines.push(format!("r/{sub}"));
    }
    if let Some(url) = r.url {
        lines.push(url);
    }
    match (r.title, r.text) {
        (Some(title), text) => {
            lines.extend(text);
            Ok(Meme {
                title,
                lines,
                placeholder: false,
            })
        }
        (None, Some(text)) => Ok(Meme {
            title: text,
            lines,
            placeholder: false,
        }),
        (None, None) => Err(anyhow!("meme response has neither title nor text")),
    }
}

async fn fetch(url: &str, timeout: Duration) -> Result<Meme> {
    let c = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("meme client build failed")?;
    let resp = c.get(url).send().await.context("meme request failed")?;

    if !resp.status().is_success() {
        return Err(anyhow!("meme HTTP {}", resp.status()));
    }

    let body = resp.text().await.context("meme body read failed")?;
    parse_meme(&body)
}

fn fetch_blocking(url: &str, timeout: Duration) -> Result<Meme> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("meme runtime build failed")?;
    rt.block_on(fetch(url, timeout))
}

/// Owns the channel between fetch threads and the UI loop.
pub(crate) struct MemeFetcher {
    settings: MemeSettings,
    tx: Sender<Meme>,
    rx: Receiver<Meme>,
}

impl MemeFetcher {
    pub(crate) fn new(settings: MemeSettings) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { settings, tx, rx }
    }

    /// Starts a fetch. With fetching disabled the placeholder is queued at once.
    pub(crate) fn request(&self) {
        if !self.settings.enabled {
            let _ = self.tx.send(Meme::placeholder());
            return;
        }
        let tx = self.tx.clone();
        let url = self.settings.url.clone();
        let timeout = Duration::from_secs(self.settings.timeout_secs);

        let spawned = std::thread::Builder::new()
            .name("meme-fetch".into())
            .spawn(move || {
                let meme = match fetch_blocking(&url, timeout) {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::warn!(error = %format!("{e:#}"), "meme fetch failed, using placeholder");
                        Meme::placeholder()
                    }
                };
                let _ = tx.send(meme);
            });
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "meme thread failed to start");
            let _ = self.tx.send(Meme::placeholder());
        }
    }

    /// Non-blocking.
    pub(crate) fn poll(&self) -> Option<Meme> {
        match self.rx.try_recv() {
            Ok(m) => Some(m),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_and_url() {
        let m = parse_meme(
            r#"{"postLink":"x","subreddit":"Undertale","title":"Clover moment","url":"https://i.redd.it/a.png","nsfw":false}"#,
        )
        .unwrap();
        assert_eq!(m.title, "Clover moment");
        assert_eq!(m.lines, vec!["r/Undertale", "https://i.redd.it/a.png"]);
        assert!(!m.placeholder);
    }

    #[test]
    fn parses_text_only() {
        let m = parse_meme(r#"{"text":"howdy"}"#).unwrap();
        assert_eq!(m.title, "howdy");
        assert!(m.lines.is_empty());
    }

    #[test]
    fn rejects_empty_object_and_garbage() {
        assert!(parse_meme("{}").is_err());
        assert!(parse_meme("<html>").is_err());
    }

    #[test]
    fn disabled_fetch_yields_placeholder() {
        let settings = MemeSettings {
            enabled: false,
            ..MemeSettings::default()
        };
        let f = MemeFetcher::new(settings);
        assert!(f.poll().is_none());
        f.request();
        assert_eq!(f.poll(), Some(Meme::placeholder()));
    }
}
