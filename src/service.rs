//! Contributor-facing operations
//!
//! [`RankService`] ties the record store, scheduler, delay estimator and
//! aggregator together behind the four things the outside world does:
//! submit a capture, ask for work, read the report, and replace the tracked
//! phrases or sites.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use url::Url;

use crate::aggregator::Aggregator;
use crate::config::RankConfig;
use crate::engine::{query_from_url, url_from_query};
use crate::error::{Error, Result};
use crate::models::{NewCapture, ResultRow, WorkAssignment};
use crate::pipeline::decode_page_text;
use crate::scheduler::{DelayEstimator, PhraseRotation};
use crate::storage::SharedRankRepository;
use crate::utils::error::IntakeError;

/// A result page posted by a contributor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Submission {
    /// URL the page was fetched from
    pub url: Option<String>,
    /// Base64-encoded page markup
    pub text: Option<String>,
}

/// Rank tracking service
#[derive(Clone)]
pub struct RankService {
    repo: SharedRankRepository,
    config: RankConfig,
    search_base: Url,
    rotation: PhraseRotation,
    estimator: DelayEstimator,
    aggregator: Aggregator,
}

impl RankService {
    pub fn new(repo: SharedRankRepository, config: RankConfig) -> Result<Self> {
        let search_base = Url::parse(&config.search_base_url).map_err(|e| {
            Error::with_source(
                format!("invalid search base URL '{}'", config.search_base_url),
                e,
            )
        })?;

        Ok(Self {
            rotation: PhraseRotation::with_pool_factor(repo.clone(), config.stale_pool_factor),
            estimator: DelayEstimator::new(repo.clone(), &config),
            aggregator: Aggregator::new(repo.clone(), &config),
            repo,
            config,
            search_base,
        })
    }

    pub fn repository(&self) -> &SharedRankRepository {
        &self.repo
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Validate and store a submitted capture, returning its id
    ///
    /// The phrase is taken from the URL's `text` parameter and may be empty
    /// for pages that do not carry one.
    pub fn accept(
        &self,
        submission: Submission,
        contributor: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let url = submission
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or(IntakeError::MissingField("url"))?;
        let text = submission.text.ok_or(IntakeError::MissingField("text"))?;
        if text.trim().is_empty() {
            return Err(IntakeError::EmptyText.into());
        }
        decode_page_text(&text)?;

        let phrase = query_from_url(&url);
        let id = self.repo.insert_capture(
            &NewCapture {
                url,
                phrase: phrase.clone(),
                text,
                contributor: contributor.to_string(),
            },
            now,
        )?;

        crate::metrics::record_capture_accepted();
        tracing::info!(capture_id = id, %phrase, contributor, "Capture accepted");
        Ok(id)
    }

    /// Hand out the next batch of search URLs and the delay before asking again
    ///
    /// `requested` is clamped into `1..=max_amount`; absent means the default
    /// amount. The delay is sized for the clamped amount even when fewer
    /// phrases exist.
    pub fn work<R: Rng + ?Sized>(
        &self,
        requested: Option<usize>,
        address: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<WorkAssignment> {
        let amount = self.config.clamp_amount(requested);
        let phrases = self.rotation.rotate(amount, rng)?;
        let delay = self.estimator.estimate(amount, address, now)?;

        let donors: Vec<String> = phrases
            .iter()
            .map(|p| url_from_query(&self.search_base, p))
            .collect();

        crate::metrics::record_work_request();
        tracing::debug!(address, amount, handed_out = donors.len(), "Work assigned");

        Ok(WorkAssignment {
            delay: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            donors,
        })
    }

    /// Current position report
    pub fn results(&self, now: DateTime<Utc>) -> Result<Vec<ResultRow>> {
        self.aggregator.report(now)
    }

    /// Replace the tracked phrase set, returning how many are tracked
    pub fn replace_phrases(&self, phrases: &[String]) -> Result<usize> {
        let count = self.repo.replace_phrases(phrases)?;
        tracing::info!(count, "Tracked phrases replaced");
        Ok(count)
    }

    /// Replace the sites of interest, returning how many are stored
    pub fn replace_sites(&self, sites: &[String]) -> Result<usize> {
        let count = self.repo.replace_sites(sites)?;
        tracing::info!(count, "Sites of interest replaced");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MockRankRepository, RankRepository};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn service() -> (Arc<MockRankRepository>, RankService) {
        let repo = Arc::new(MockRankRepository::new());
        let service = RankService::new(repo.clone(), RankConfig::default()).unwrap();
        (repo, service)
    }

    fn submission(url: Option<&str>, text: Option<&str>) -> Submission {
        Submission {
            url: url.map(str::to_string),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_accept_stores_capture_with_phrase() {
        let (repo, service) = service();
        let text = STANDARD.encode("<html></html>");
        let id = service
            .accept(
                submission(Some("https://yandex.ru/search/?text=red%20shoes"), Some(&text)),
                "10.0.0.1",
                Utc::now(),
            )
            .unwrap();

        let capture = repo.get_capture(id).unwrap().unwrap();
        assert_eq!(capture.phrase, "red shoes");
        assert_eq!(capture.text, text);
        assert_eq!(capture.contributor, "10.0.0.1");
        assert!(capture.is_pending());
    }

    #[test]
    fn test_accept_rejects_invalid_submissions() {
        let (repo, service) = service();
        let now = Utc::now();

        let cases = [
            (submission(None, Some("aGk=")), IntakeError::MissingField("url")),
            (submission(Some("  "), Some("aGk=")), IntakeError::MissingField("url")),
            (
                submission(Some("https://yandex.ru/search/?text=a"), None),
                IntakeError::MissingField("text"),
            ),
            (
                submission(Some("https://yandex.ru/search/?text=a"), Some("")),
                IntakeError::EmptyText,
            ),
        ];
        for (sub, expected) in cases {
            match service.accept(sub, "10.0.0.1", now) {
                Err(Error::Intake(e)) => assert_eq!(e, expected),
                other => panic!("expected intake error, got {other:?}"),
            }
        }

        let err = service
            .accept(
                submission(Some("https://yandex.ru/search/?text=a"), Some("***")),
                "10.0.0.1",
                now,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Intake(IntakeError::InvalidBase64(_))));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_work_returns_search_urls_and_delay() {
        let (repo, service) = service();
        service
            .replace_phrases(&["red shoes".to_string(), "hats".to_string()])
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let work = service
            .work(Some(10), "10.0.0.1", Utc::now(), &mut rng)
            .unwrap();
        assert_eq!(work.donors.len(), 2);
        assert!(work
            .donors
            .iter()
            .all(|d| d.starts_with("https://yandex.ru/search/?text=")));
        // Nobody was active before this request
        assert_eq!(work.delay, 600_000);
        assert_eq!(
            repo.count_active_contributors(Utc::now() - chrono::Duration::hours(1))
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_invalid_search_base_rejected() {
        let config = RankConfig {
            search_base_url: "not a url".to_string(),
            ..RankConfig::default()
        };
        assert!(RankService::new(Arc::new(MockRankRepository::new()), config).is_err());
    }
}
