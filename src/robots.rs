//! robots.txt parsing and a per-origin gate.

use crate::fetch::{HttpFetch, HttpResponse};
use reqwest::Url;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    allow: bool,
    pattern: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
}

/// Parsed robots.txt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsTxt {
    groups: Vec<Group>,
}

/// Parse robots.txt content. Unknown directives are ignored.
pub fn parse_robots(content: &str) -> RobotsTxt {
    let mut groups: Vec<Group> = Vec::new();
    let mut current: Option<Group> = None;

    for raw in content.lines() {
        let line = raw.split('#').next().unwrap_or("").trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                // A user-agent line after rules starts a new group.
                if current.as_ref().is_some_and(|g| !g.rules.is_empty()) {
                    groups.extend(current.take());
                }
                current
                    .get_or_insert_with(Group::default)
                    .agents
                    .push(value.to_ascii_lowercase());
            }
            "allow" | "disallow" => {
                let Some(group) = current.as_mut() else {
                    continue;
                };
                // `Disallow:` with no path allows everything.
                if value.is_empty() {
                    continue;
                }
                group.rules.push(Rule {
                    allow: key == "allow",
                    pattern: value.to_string(),
                });
            }
            _ => {}
        }
    }
    groups.extend(current);

    RobotsTxt { groups }
}

/// `*` matches any run, a trailing `$` anchors the end; otherwise a prefix match.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(p) => (p, true),
        None => (pattern, false),
    };

    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or("");
    let Some(mut rest) = path.strip_prefix(first) else {
        return false;
    };

    let pieces: Vec<&str> = parts.collect();
    for (i, piece) in pieces.iter().enumerate() {
        let last = i + 1 == pieces.len();
        if last && anchored {
            return rest.ends_with(piece);
        }
        match rest.find(piece) {
            Some(pos) => rest = &rest[pos + piece.len()..],
            None => return false,
        }
    }

    !anchored || rest.is_empty()
}

impl RobotsTxt {
    /// The group for `user_agent`: the longest agent name contained in the
    /// agent's product token, else the `*` group.
    fn group_for(&self, user_agent: &str) -> Option<&Group> {
        let token = user_agent
            .split('/')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        let specific = self
            .groups
            .iter()
            .flat_map(|g| g.agents.iter().map(move |a| (a, g)))
            .filter(|(a, _)| a.as_str() != "*" && !a.is_empty() && token.contains(a.as_str()))
            .max_by_key(|(a, _)| a.len())
            .map(|(_, g)| g);

        specific.or_else(|| self.groups.iter().find(|g| g.agents.iter().any(|a| a == "*")))
    }

    /// Longest matching rule wins; on equal length Allow wins. No match allows.
    pub fn is_allowed(&self, user_agent: &str, path: &str) -> bool {
        let Some(group) = self.group_for(user_agent) else {
            return true;
        };

        group
            .rules
            .iter()
            .filter(|r| pattern_matches(&r.pattern, path))
            .max_by(|a, b| {
                a.pattern
                    .len()
                    .cmp(&b.pattern.len())
                    .then(a.allow.cmp(&b.allow))
            })
            .map_or(true, |r| r.allow)
    }
}

/// What a site's robots.txt means for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsPolicy {
    AllowAll,
    DisallowAll,
    Rules(RobotsTxt),
}

impl RobotsPolicy {
    /// 2xx is parsed; 401/403 and server errors disallow everything;
    /// anything else (a missing file) allows.
    pub fn from_response(response: &HttpResponse) -> Self {
        match response.status {
            200..=299 => RobotsPolicy::Rules(parse_robots(&response.body)),
            401 | 403 | 500..=599 => RobotsPolicy::DisallowAll,
            _ => RobotsPolicy::AllowAll,
        }
    }

    pub fn allows(&self, user_agent: &str, path: &str) -> bool {
        match self {
            RobotsPolicy::AllowAll => true,
            RobotsPolicy::DisallowAll => false,
            RobotsPolicy::Rules(rules) => rules.is_allowed(user_agent, path),
        }
    }
}

/// Path plus query, the part robots rules match against.
fn request_path(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

/// Checks URLs against robots.txt, fetching each origin's file once.
pub struct RobotsGate<'a, F: HttpFetch> {
    fetcher: &'a F,
    user_agent: String,
    cache: HashMap<String, RobotsPolicy>,
}

impl<'a, F: HttpFetch> RobotsGate<'a, F> {
    pub fn new(fetcher: &'a F, user_agent: impl Into<String>) -> Self {
        Self {
            fetcher,
            user_agent: user_agent.into(),
            cache: HashMap::new(),
        }
    }

    fn policy_for(&mut self, origin: &str) -> &RobotsPolicy {
        let fetcher = self.fetcher;
        self.cache.entry(origin.to_string()).or_insert_with(|| {
            let robots_url = format!("{}/robots.txt", origin);
            match fetcher.get(&robots_url) {
                Ok(response) => {
                    debug!(url = %robots_url, status = response.status, "fetched robots.txt");
                    RobotsPolicy::from_response(&response)
                }
                Err(e) => {
                    warn!(url = %robots_url, error = %e, "robots.txt unavailable, allowing");
                    RobotsPolicy::AllowAll
                }
            }
        })
    }

    /// Whether `url` may be fetched. Unparseable URLs are left to the fetch
    /// itself to reject.
    pub fn allows(&mut self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                warn!(url, error = %e, "cannot parse URL for robots check");
                return true;
            }
        };
        let origin = parsed.origin().ascii_serialization();
        let path = request_path(&parsed);
        let user_agent = self.user_agent.clone();
        self.policy_for(&origin).allows(&user_agent, &path)
    }
}
