//! Generative insight client and prompt builders.
//!
//! Insights are produced by the Gemini REST endpoint. The client is
//! optional: without an API key every caller falls back to a fixed
//! placeholder string, and the data sections are unaffected. Prompt
//! construction is kept in free functions so it can be tested without a
//! network.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::market::performers::PerformerRecord;
use crate::sector::{InstitutionalActivity, SectorRecord};

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const MAX_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

pub const SECTOR_INSIGHTS_UNAVAILABLE: &str = "Sector insights not available (API key missing)";
pub const INSTITUTIONAL_INSIGHTS_UNAVAILABLE: &str =
    "Institutional insights not available (API key missing)";
pub const OVERVIEW_INSIGHTS_UNAVAILABLE: &str = "Market analysis unavailable at this time.";
pub const PERFORMERS_INSIGHTS_SKIPPED: &str =
    "Insights generation skipped - Gemini API key not configured";
pub const SNAPSHOT_INSIGHTS_UNAVAILABLE: &str = "Snapshot insights not available (API key missing)";

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Thin client over the `generateContent` endpoint with bounded retry.
pub struct InsightClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl InsightClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Point the client at another host (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Generate text for a prompt. Transport errors are retried once;
    /// an empty candidate list is an error.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.2,
                "maxOutputTokens": 1024,
            }
        });

        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_generate(&url, &body).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(attempt, error = %e, "Insight generation attempt failed");
                    last_error = Some(e);
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    }
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow!("insight generation failed")))
    }

    async fn try_generate(&self, url: &str, body: &Value) -> Result<String> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("insight request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("insight endpoint returned HTTP {}", status));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .context("failed to decode insight response")?;

        let text: String = payload
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(anyhow!("insight response contained no text"));
        }
        debug!(chars = text.len(), "Generated insight text");
        Ok(text.trim().to_string())
    }
}

// ============================================================================
// Prompt builders
// ============================================================================

fn sector_digest(sectors: &[SectorRecord]) -> String {
    sectors
        .iter()
        .take(5)
        .map(|s| {
            format!(
                "- {}: {:.2}% change, {} advances, {} declines",
                s.sector_name, s.change_percentage, s.advances, s.declines
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn institutional_digest(activity: &InstitutionalActivity) -> String {
    format!(
        "FII: Buy INR{:.2} Cr, Sell INR{:.2} Cr, Net INR{:.2} Cr\n\
         DII: Buy INR{:.2} Cr, Sell INR{:.2} Cr, Net INR{:.2} Cr",
        activity.fii.buy_value,
        activity.fii.sell_value,
        activity.fii.net_value,
        activity.dii.buy_value,
        activity.dii.sell_value,
        activity.dii.net_value,
    )
}

pub fn sector_insights_prompt(sectors: &[SectorRecord]) -> String {
    format!(
        "Based on the following sector data, provide 6-7 concise bullet-point insights:\n\n\
         Top 5 Sector Movements:\n{}\n\n\
         Please provide exactly 6-7 bullet points covering sector strength and weakness, \
         the broader economic trends these movements indicate, opportunities and risks, \
         the impact of sector rotation, key takeaways for sector investors, the outlook \
         for sector performance, and what to watch in coming sessions.\n\n\
         Guidelines:\n\
         - Each point must be one sentence maximum\n\
         - Focus on actionable insights\n\
         - Use professional, formal tone\n\
         - Avoid generic statements\n\
         - Highlight key implications",
        sector_digest(sectors)
    )
}

pub fn institutional_insights_prompt(activity: &InstitutionalActivity) -> String {
    format!(
        "Based on the following institutional investment data, provide 6-7 concise \
         bullet-point insights:\n\n\
         Institutional Activity:\n{}\n\n\
         Please provide exactly 6-7 bullet points covering what the FII/DII pattern \
         indicates, what could be driving these flows, the likely impact on the broader \
         market, the outlook for institutional activity, key takeaways for retail \
         investors, comparison to historical patterns, and what to watch in coming \
         sessions.\n\n\
         Guidelines:\n\
         - Each point must be one sentence maximum\n\
         - Focus on actionable insights\n\
         - Use professional, formal tone\n\
         - Avoid generic statements\n\
         - Highlight key implications",
        institutional_digest(activity)
    )
}

pub fn overview_insights_prompt(digest: &str) -> String {
    format!(
        "As a professional financial analyst, provide a comprehensive analysis of the \
         Indian market indices in exactly 6 sentences.\n\
         Use this data for your analysis:\n\n{digest}\n\n\
         Your analysis should cover:\n\
         1. Overall market sentiment and major index movements\n\
         2. Sector-specific performance (IT, Banking, etc.)\n\
         3. Key factors influencing today's market\n\
         4. Notable outliers or significant data points\n\
         5. Brief market outlook based on today's performance"
    )
}

pub fn snapshot_insights_prompt(snapshot: &Map<String, Value>) -> String {
    let data = serde_json::to_string_pretty(snapshot).unwrap_or_default();
    format!(
        "You are a professional financial analyst.\n\
         Analyze the following JSON data on Indian stock market indices. Generate 6-7 \
         concise insights.\n\n\
         Guidelines:\n\
         - Each insight must be one sentence maximum\n\
         - Focus on clear market implications\n\
         - Identify key technical patterns and their significance\n\
         - Mention support/resistance levels when relevant\n\
         - Highlight overbought/oversold conditions\n\
         - Provide actionable insights for traders/investors\n\n\
         Input Data:\n{data}\n\n\
         Output:\n\
         - Exactly 6-7 bullet points\n\
         - Each point < 15 words\n\
         - Professional, formal tone\n\
         - No extra explanations"
    )
}

pub fn performers_insights_prompt(
    gainers: &[PerformerRecord],
    losers: &[PerformerRecord],
    date: &str,
) -> String {
    let render = |rows: &[PerformerRecord], signed: bool| -> String {
        if rows.is_empty() {
            return "No data available".to_string();
        }
        rows.iter()
            .map(|r| {
                if signed {
                    format!(
                        "- {}: Current price INR{:.2}, Change: +INR{:.2} (+{:.2}%)",
                        r.company_name, r.current_price, r.price_change, r.percentage_change
                    )
                } else {
                    format!(
                        "- {}: Current price INR{:.2}, Change: INR{:.2} ({:.2}%)",
                        r.company_name, r.current_price, r.price_change, r.percentage_change
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are a stock market expert analyzing today's top gainers and losers.\n\n\
         Today's date: {date}\n\n\
         Top Gainers:\n{}\n\n\
         Top Losers:\n{}\n\n\
         Based on the above data, provide 3-5 brief bullet points (one sentence each) \
         summarizing overall stock sentiment, notable patterns, and key individual stock \
         movements. Keep your entire response to 3-5 concise bullet points only.",
        render(gainers, true),
        render(losers, false)
    )
}

pub fn market_analysis_prompt(document: &Value) -> String {
    let data = serde_json::to_string_pretty(document).unwrap_or_default();
    format!(
        "You are an expert financial analyst specializing in Indian stock markets.\n\
         Analyze the following market data and present your insights in a structured and \
         concise manner.\n\n\
         Focus your response on the most critical and impactful observations from the \
         following aspects:\n\
         - Overall market sentiment and direction\n\
         - Sector-specific movements and standout sectors\n\
         - Key technical indicators and their interpretations\n\
         - Institutional investment activity (FII/DII)\n\
         - Notable news events and their market implications\n\
         - Global market cues and potential catalysts\n\n\
         Guidelines:\n\
         - Provide exactly 6-7 key insights in bullet points.\n\
         - Each point should be one sentence maximum.\n\
         - Use a professional tone with no hedging or generic language.\n\
         - Avoid repetition and maintain high information density.\n\
         - Focus on actionable insights and clear market implications.\n\n\
         Market Data:\n{data}\n\n\
         Write your analysis as 6-7 powerful bullet points:"
    )
}

pub fn market_summary_prompt(document: &Value, analysis: &str) -> String {
    let data = serde_json::to_string_pretty(document).unwrap_or_default();
    format!(
        "You are an expert financial analyst specializing in Indian stock markets.\n\
         Create a concise executive summary of the following market data and analysis.\n\n\
         Focus your summary on the most impactful insights from the report, including \
         key market takeaways and directional sentiment, sector highlights and \
         underperformers, notable technical and institutional indicators (FII/DII), \
         significant macro or news-related influences, and a short forward-looking \
         outlook.\n\n\
         Guidelines:\n\
         - Present exactly 6-7 high-impact bullet points\n\
         - Each point must be one sentence maximum\n\
         - Use a confident, professional tone with actionable language\n\
         - Avoid narrative fluff and general statements\n\
         - Focus on clear market implications and actionable insights\n\n\
         Market Data:\n{data}\n\n\
         Market Analysis:\n{analysis}\n\n\
         Write your executive summary as 6-7 strong bullet points:"
    )
}

/// Split generated text into clean bullet lines: strips list markers,
/// drops blank lines and meta-commentary.
pub fn clean_insight_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_start_matches(['-', '*', ' ']).trim().to_string())
        .filter(|line| {
            if line.is_empty() {
                return false;
            }
            let lowered = line.to_lowercase();
            !["insight", "below", "here"]
                .iter()
                .any(|marker| lowered.contains(marker))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
