//! Posting data structure.

use serde::{Deserialize, Serialize};

use crate::models::{Fingerprint, Fingerprinted};

/// A recently added row of the postings board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    /// Cleaned posting title
    pub title: String,

    /// Absolute URL to the posting
    pub link: String,

    /// Secondary details (date, author department), ` | ` separated
    pub meta: String,
}

impl Fingerprinted for Posting {
    fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&[self.title.as_str(), self.link.as_str()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posting() -> Posting {
        Posting {
            title: "2026학년도 1학기 국가장학금 신청 안내".to_string(),
            link: "https://www.kw.ac.kr/ko/life/notice.jsp?mode=view&id=1".to_string(),
            meta: "2026-01-07 | 학생복지팀".to_string(),
        }
    }

    #[test]
    fn test_fingerprint_ignores_meta() {
        let a = sample_posting();
        let mut b = sample_posting();
        b.meta = "2026-01-08 | 학생복지팀".to_string();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_tracks_link() {
        let a = sample_posting();
        let mut b = sample_posting();
        b.link.push('0');
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
