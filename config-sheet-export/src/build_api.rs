//! Upload to the remote build service, which returns a URL to the packaged
//! configuration.

use std::time::Duration;

use config_sheet_core::{Attempt, Config, RetryError, RetryPolicy, RunLog, Settings};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::error::BuildError;

/// The remote build service.
pub trait BuildApi {
    /// Submit a config; returns the download URL of the built archive.
    fn build(&self, config: &Config) -> Result<String, BuildError>;
}

#[derive(Deserialize)]
struct BuildReply {
    url: Option<String>,
}

/// Blocking HTTP client for the build service.
pub struct HttpBuildApi {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl HttpBuildApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BuildError> {
        let http = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, BuildError> {
        Self::new(
            &settings.build_api_url,
            Duration::from_secs(settings.build_timeout_secs),
        )
    }
}

impl BuildApi for HttpBuildApi {
    fn build(&self, config: &Config) -> Result<String, BuildError> {
        let body = serde_json::to_vec(config)?;
        let resp = self
            .http
            .post(format!("{}/build", self.base_url))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(BuildError::ServerError {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }
        parse_reply(&text)
    }
}

fn parse_reply(text: &str) -> Result<String, BuildError> {
    let reply: BuildReply = serde_json::from_str(text)?;
    reply
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| BuildError::invalid_response("reply has no url"))
}

/// Upload with bounded exponential backoff. Errors propagate once the
/// policy gives up.
pub fn upload_config(
    api: &dyn BuildApi,
    config: &Config,
    policy: &RetryPolicy,
    run_log: &mut RunLog,
) -> Result<String, BuildError> {
    let result = policy.run(|attempt| {
        if attempt > 1 {
            log::info!("Retrying build upload (attempt {attempt})");
        }
        match api.build(config) {
            Ok(url) => Attempt::Success(url),
            Err(e) if e.is_retryable() => Attempt::Retry(e),
            Err(e) => Attempt::Fatal(e),
        }
    });

    match result {
        Ok(url) => {
            run_log.info(format!("Build finished: {url}"));
            Ok(url)
        }
        Err(RetryError::Fatal(e)) => {
            run_log.error(format!("Build failed: {e}"));
            Err(e)
        }
        Err(e) => {
            run_log.error(format!("Build failed: {e}"));
            Err(BuildError::GaveUp(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use config_sheet_core::Metadata;

    use super::*;

    struct ScriptedApi {
        replies: RefCell<Vec<Result<String, BuildError>>>,
        calls: Cell<u32>,
    }

    impl ScriptedApi {
        fn new(mut replies: Vec<Result<String, BuildError>>) -> Self {
            replies.reverse();
            Self {
                replies: RefCell::new(replies),
                calls: Cell::new(0),
            }
        }
    }

    impl BuildApi for ScriptedApi {
        fn build(&self, _config: &Config) -> Result<String, BuildError> {
            self.calls.set(self.calls.get() + 1);
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err(BuildError::invalid_response("script exhausted")))
        }
    }

    fn config() -> Config {
        Config {
            metadata: Metadata {
                dataset_id: "config-x".into(),
                name: "X".into(),
                version: "24.01.01".into(),
                description: None,
                primary_language: None,
            },
            package_json: None,
            fields: vec![],
            presets: vec![],
            icons: vec![],
            messages: Default::default(),
        }
    }

    fn busy() -> BuildError {
        BuildError::ServerError {
            status: 503,
            message: "busy".into(),
        }
    }

    #[test]
    fn retries_transient_failures() {
        let api = ScriptedApi::new(vec![Err(busy()), Ok("https://build.test/x.zip".into())]);
        let mut log = RunLog::silent("test");
        let url = upload_config(&api, &config(), &RetryPolicy::immediate(3), &mut log).unwrap();
        assert_eq!(url, "https://build.test/x.zip");
        assert_eq!(api.calls.get(), 2);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let api = ScriptedApi::new(vec![Err(busy()), Err(busy()), Err(busy()), Err(busy())]);
        let mut log = RunLog::silent("test");
        let err = upload_config(&api, &config(), &RetryPolicy::immediate(3), &mut log).unwrap_err();
        assert!(matches!(err, BuildError::GaveUp(_)));
        assert_eq!(api.calls.get(), 3);
        assert_eq!(log.summary().errors, 1);
    }

    #[test]
    fn client_errors_are_not_retried() {
        let api = ScriptedApi::new(vec![Err(BuildError::ServerError {
            status: 400,
            message: "bad config".into(),
        })]);
        let err = upload_config(
            &api,
            &config(),
            &RetryPolicy::immediate(3),
            &mut RunLog::silent("test"),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::ServerError { status: 400, .. }));
        assert_eq!(api.calls.get(), 1);
    }

    #[test]
    fn reply_must_carry_url() {
        assert_eq!(parse_reply(r#"{"url":"https://x"}"#).unwrap(), "https://x");
        assert!(parse_reply(r#"{"status":"ok"}"#).is_err());
        assert!(parse_reply("not json").is_err());
    }
}
