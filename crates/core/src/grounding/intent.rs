/// Coarse analytics bucket derived from the utterance by fixed keywords.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    HangItem,
    MountItem,
    Repair,
    LocateProduct,
    GeneralQuestion,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HangItem => "hang_item",
            Self::MountItem => "mount_item",
            Self::Repair => "repair",
            Self::LocateProduct => "locate_product",
            Self::GeneralQuestion => "general_question",
        }
    }
}

/// First bucket whose keyword list matches wins; order is fixed.
pub fn classify(transcript: &str) -> Intent {
    let lower = transcript.to_lowercase();

    if contains_any(&lower, &["hang", "picture", "frame"]) {
        return Intent::HangItem;
    }
    if contains_any(&lower, &["mount", "tv", "shelf"]) {
        return Intent::MountItem;
    }
    if contains_any(&lower, &["fix", "repair"]) {
        return Intent::Repair;
    }
    if contains_any(&lower, &["find", "where"]) {
        return Intent::LocateProduct;
    }
    Intent::GeneralQuestion
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::{classify, Intent};

    #[test]
    fn buckets_match_fixed_keywords() {
        assert_eq!(classify("How do I hang a mirror?"), Intent::HangItem);
        assert_eq!(classify("best way to mount a tv"), Intent::MountItem);
        assert_eq!(classify("need to repair a hole"), Intent::Repair);
        assert_eq!(classify("where are the screws"), Intent::LocateProduct);
        assert_eq!(classify("do you price match?"), Intent::GeneralQuestion);
    }

    #[test]
    fn earlier_buckets_win() {
        // "picture" (hang) appears alongside "where" (locate).
        assert_eq!(classify("where do I put this picture"), Intent::HangItem);
    }
}
