//! Content negotiation between JSON and tabular exports.

use crate::json::to_js_string;
use crate::record::Record;
use crate::schema::ResourceKind;
use crate::tabular::format_with_separator;
use log::{debug, warn};
use std::cmp::Ordering;

/// Media types a result set can be rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// `application/json`, the fallback for anything unmatched.
    Json,
    /// `text/plain`, rendered tab-separated.
    PlainText,
    /// `text/tab-separated-values`.
    TabSeparated,
    /// `text/csv`.
    Csv,
}

impl MediaType {
    /// Candidates in tie-break order.
    pub const ALL: [MediaType; 4] = [
        MediaType::Json,
        MediaType::PlainText,
        MediaType::TabSeparated,
        MediaType::Csv,
    ];

    /// Bare `type/subtype`.
    pub fn essence(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::PlainText => "text/plain",
            Self::TabSeparated => "text/tab-separated-values",
            Self::Csv => "text/csv",
        }
    }

    /// Full `Content-Type` header value.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::PlainText => "text/plain; charset=utf-8",
            Self::TabSeparated => "text/tab-separated-values; charset=utf-8",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }

    /// Cell separator for tabular types, `None` for JSON.
    pub fn separator(self) -> Option<char> {
        match self {
            Self::Json => None,
            Self::PlainText | Self::TabSeparated => Some('\t'),
            Self::Csv => Some(','),
        }
    }

    /// Map a URL format extension (`csv`, `tsv`, `txt`, `json`) to a media type.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::TabSeparated),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    fn type_and_subtype(self) -> (&'static str, &'static str) {
        self.essence()
            .split_once('/')
            .unwrap_or((self.essence(), ""))
    }
}

/// A rendered response body and the media type it was rendered as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedBody {
    pub media_type: MediaType,
    pub body: String,
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone)]
struct MediaRange<'a> {
    kind: &'a str,
    subtype: &'a str,
    quality: f32,
    index: usize,
}

impl MediaRange<'_> {
    /// How specifically this range matches a media type, if at all.
    fn specificity(&self, media_type: MediaType) -> Option<u8> {
        let (kind, subtype) = media_type.type_and_subtype();
        if self.kind == "*" && self.subtype == "*" {
            return Some(0);
        }
        if !self.kind.eq_ignore_ascii_case(kind) {
            return None;
        }
        if self.subtype == "*" {
            return Some(1);
        }
        self.subtype.eq_ignore_ascii_case(subtype).then_some(2)
    }
}

/// Candidate score: quality, specificity, position in the header, candidate order.
#[derive(Debug, Clone, Copy)]
struct Score {
    quality: f32,
    specificity: u8,
    index: usize,
    order: usize,
}

fn parse_accept(header: &str) -> Vec<MediaRange<'_>> {
    let mut ranges = Vec::new();
    for (index, entry) in header.split(',').enumerate() {
        let mut parts = entry.split(';');
        let Some((kind, subtype)) = parts.next().and_then(|range| range.trim().split_once('/'))
        else {
            continue;
        };
        let (kind, subtype) = (kind.trim(), subtype.trim());
        if kind.is_empty() || subtype.is_empty() {
            continue;
        }
        let mut quality = Some(1.0_f32);
        for param in parts {
            if let Some((name, value)) = param.split_once('=')
                && name.trim().eq_ignore_ascii_case("q")
            {
                quality = value
                    .trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|q| q.is_finite())
                    .map(|q| q.clamp(0.0, 1.0));
            }
        }
        let Some(quality) = quality else {
            continue;
        };
        ranges.push(MediaRange {
            kind,
            subtype,
            quality,
            index,
        });
    }
    ranges
}

/// Pick the media type to render for an `Accept` header value.
///
/// Missing, empty, malformed or unmatched preferences all resolve to JSON.
pub fn select_media_type(accept: Option<&str>) -> MediaType {
    let Some(header) = accept.map(str::trim).filter(|header| !header.is_empty()) else {
        return MediaType::Json;
    };
    let ranges = parse_accept(header);

    let mut scored: Vec<(MediaType, Score)> = MediaType::ALL
        .iter()
        .enumerate()
        .filter_map(|(order, media_type)| {
            ranges
                .iter()
                .filter_map(|range| range.specificity(*media_type).map(|s| (s, range)))
                .max_by(|(a_spec, a), (b_spec, b)| {
                    a_spec.cmp(b_spec).then_with(|| b.index.cmp(&a.index))
                })
                .map(|(specificity, range)| {
                    (
                        *media_type,
                        Score {
                            quality: range.quality,
                            specificity,
                            index: range.index,
                            order,
                        },
                    )
                })
        })
        .filter(|(_, score)| score.quality > 0.0)
        .collect();

    scored.sort_by(|(_, a), (_, b)| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.specificity.cmp(&a.specificity))
            .then_with(|| a.index.cmp(&b.index))
            .then_with(|| a.order.cmp(&b.order))
    });

    let selected = scored
        .first()
        .map(|(media_type, _)| *media_type)
        .unwrap_or(MediaType::Json);
    debug!("negotiated {} for accept={header:?}", selected.essence());
    selected
}

/// Render `records` in the format preferred by `accept`.
pub fn negotiate(accept: Option<&str>, kind: ResourceKind, records: &[Record]) -> NegotiatedBody {
    let media_type = select_media_type(accept);
    let body = match media_type.separator() {
        Some(separator) => format_with_separator(records, kind, separator),
        None => match to_js_string(records) {
            Ok(body) => body,
            Err(err) => {
                warn!("failed to serialize {kind} records as json: {err}");
                "[]".to_string()
            }
        },
    };
    NegotiatedBody { media_type, body }
}
