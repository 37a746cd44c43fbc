//! Keyword classifiers over flat contract text. Matching is lowercase
//! substring containment; both return 1 for a positive decision, else 0.

const SUPPORT_STRONG: &[&str] = &[
    "software support agreement",
    "support agreement",
    "software support order",
    "support contract",
    "software maintenance agreement",
    "maintenance agreement",
];

const SUPPORT_KEYWORDS: &[&str] = &[
    "maintenance and support",
    "software support",
    "support services",
    "maintenance services",
    "sustainment",
    "service level agreement",
    "sla",
    "error resolution",
    "help desk",
    "software maintenance",
    "technical support",
];

const SERVICE_KEYWORDS: &[&str] = &[
    "patches",
    "upgrades",
    "bug fixes",
    "trouble tickets",
    "incident response",
    "priority support",
    "response time",
    "uptime guarantee",
];

const RENEW_STRONG: &[&str] = &[
    "will renew automatically",
    "renew automatically",
    "automatic renewal",
    "auto-renew",
    "automatically renews",
];

const RENEW_MEDIUM: &[&str] = &[
    "renewal date",
    "automatic extension",
    "auto renewal",
    "continues automatically",
    "automatic continuation",
];

const RENEW_NEGATIVE: &[&str] = &[
    "will not renew",
    "does not renew automatically",
    "requires renewal",
    "upon mutual agreement",
    "expires unless renewed",
    "requires written notice to renew",
    "must be renewed",
    "renewal requires",
    "no automatic renewal",
];

const RENEW_CONTEXT: &[&str] = &[
    "renewal date",
    "on the renewal date",
    "at the renewal date",
    "renewal will be automatic",
    "renewal is automatic",
];

fn count(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

fn any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Is this a software support / maintenance contract?
pub fn detect_support_contract(text: &str) -> u8 {
    if text.is_empty() {
        return 0;
    }
    let text = text.to_lowercase();

    if any(&text, SUPPORT_STRONG) {
        return 1;
    }

    let support = count(&text, SUPPORT_KEYWORDS);
    let service = count(&text, SERVICE_KEYWORDS);
    let positive = support >= 3 || (support >= 2 && service >= 2) || service >= 4;
    u8::from(positive)
}

/// Does the contract term renew automatically? Negative language wins.
pub fn detect_auto_renew(text: &str) -> u8 {
    if text.is_empty() {
        return 0;
    }
    let text = text.to_lowercase();

    if any(&text, RENEW_NEGATIVE) {
        return 0;
    }
    if any(&text, RENEW_STRONG) || count(&text, RENEW_MEDIUM) >= 2 {
        return 1;
    }
    u8::from(text.contains("renewal") && any(&text, RENEW_CONTEXT))
}

// ── Tests ──
