//! UTM campaign extraction.

use spectacle_types::Campaign;
use url::Url;

/// Reads the five UTM parameters from `url`.
///
/// `utm_campaign` maps to `name`; the others keep their suffix. Missing or
/// empty parameters stay `None` and are left out of the payload. When a
/// parameter repeats, the first occurrence wins.
pub fn extract_campaign(url: &str) -> Campaign {
    let mut campaign = Campaign::default();
    if url.is_empty() {
        return campaign;
    }
    let Ok(parsed) = Url::parse(url) else {
        return campaign;
    };

    for (key, value) in parsed.query_pairs() {
        if value.is_empty() {
            continue;
        }
        let slot = match key.as_ref() {
            "utm_source" => &mut campaign.source,
            "utm_medium" => &mut campaign.medium,
            "utm_campaign" => &mut campaign.name,
            "utm_term" => &mut campaign.term,
            "utm_content" => &mut campaign.content,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    campaign
}
