//! Browser session and the narrow capture contract.
//!
//! The sequencer only sees [`CaptureTarget`]; the Chrome DevTools Protocol
//! plumbing lives in [`Session`].

use crate::config::BrowserConfig as LaunchConfig;
use crate::{Error, Result};
use base64::Engine as _;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// How often a polled condition is re-evaluated.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The contract the capture sequencer drives. One in-flight request at a
/// time; no retries.
#[allow(async_fn_in_trait)]
pub trait CaptureTarget {
    /// Capture the viewport as PNG and write it to `path`.
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// Evaluate a JS expression in the page and deserialize its value.
    async fn evaluate<T: DeserializeOwned>(&self, js: &str) -> Result<T>;

    /// Run a JS statement in the page, discarding the result.
    async fn execute(&self, js: &str) -> Result<()>;

    /// Poll a JS predicate until it returns true. `Ok(false)` on timeout;
    /// the caller decides whether that is fatal.
    async fn wait_for_condition(&self, predicate_js: &str, timeout: Duration) -> Result<bool>;

    /// Wait until the element matching `selector` is present and visible.
    async fn wait_for_element_visible(&self, selector: &str, timeout: Duration) -> Result<()>;
}

/// A scoped Chromium session: launched once per capture run, closed on
/// every exit path.
pub struct Session {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

impl Session {
    /// Launch Chromium and open `url`.
    pub async fn launch(config: &LaunchConfig, url: &str) -> Result<Self> {
        let viewport = config.viewport;
        let mut builder = BrowserConfig::builder()
            .window_size(viewport.width, viewport.height)
            .no_sandbox();
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(Error::Config)?;

        debug!(
            "launching browser (headless: {}, viewport: {}x{})",
            config.headless, viewport.width, viewport.height
        );
        let (mut browser, mut handler) = Browser::launch(browser_config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match Self::open_page(&browser, url, viewport).await {
            Ok(page) => page,
            Err(e) => {
                // Launch succeeded but navigation failed; do not leak the
                // browser process.
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                return Err(e);
            }
        };

        Ok(Self {
            browser,
            handler_task,
            page,
        })
    }

    async fn open_page(
        browser: &Browser,
        url: &str,
        viewport: crate::config::Viewport,
    ) -> Result<Page> {
        let page = browser.new_page(url).await?;
        page.execute(SetDeviceMetricsOverrideParams::new(
            viewport.width as i64,
            viewport.height as i64,
            1.0,
            false,
        ))
        .await?;
        page.wait_for_navigation().await?;
        Ok(page)
    }

    /// Close the browser and reap the process.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        self.handler_task.abort();
        Ok(())
    }
}

impl CaptureTarget for Session {
    async fn screenshot(&self, path: &Path) -> Result<()> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let resp = self.page.execute(params).await?;
        let data_b64: &str = resp.data.as_ref();
        let data = base64::engine::general_purpose::STANDARD
            .decode(data_b64.as_bytes())
            .map_err(|e| Error::Capture(format!("screenshot base64 decode failed: {}", e)))?;
        std::fs::write(path, data)?;
        Ok(())
    }

    async fn evaluate<T: DeserializeOwned>(&self, js: &str) -> Result<T> {
        Ok(self.page.evaluate(js).await?.into_value()?)
    }

    async fn execute(&self, js: &str) -> Result<()> {
        self.page.evaluate(js).await?;
        Ok(())
    }

    async fn wait_for_condition(&self, predicate_js: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let satisfied: bool = self.evaluate(predicate_js).await?;
            if satisfied {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_element_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (!el) return false;
                const style = window.getComputedStyle(el);
                return style.display !== 'none' && style.visibility !== 'hidden';
            }})()"#,
            serde_json::to_string(selector).unwrap()
        );
        if self.wait_for_condition(&js, timeout).await? {
            Ok(())
        } else {
            Err(Error::Timeout(format!(
                "element '{}' not visible after {}ms",
                selector,
                timeout.as_millis()
            )))
        }
    }
}
