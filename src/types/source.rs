//! Source repository types.

use serde::{Deserialize, Serialize};

/// An input repository that sessions can work against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Resource name, e.g. `sources/github/owner/repo`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<GitHubRepo>,
}

impl Source {
    /// `owner/repo` for GitHub-backed sources.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        self.github_repo
            .as_ref()
            .map(|repo| format!("{}/{}", repo.owner, repo.repo))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRepo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<GitHubBranch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<GitHubBranch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubBranch {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
}

/// How a session uses its source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContext {
    /// Resource name of the source.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo_context: Option<GitHubRepoContext>,
}

impl SourceContext {
    /// Branch the session starts from, when one was requested.
    #[must_use]
    pub fn starting_branch(&self) -> Option<&str> {
        self.github_repo_context
            .as_ref()
            .map(|ctx| ctx.starting_branch.as_str())
            .filter(|branch| !branch.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRepoContext {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub starting_branch: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_github_source() {
        let source: Source = serde_json::from_value(json!({
            "name": "sources/github/acme/widgets",
            "id": "github/acme/widgets",
            "githubRepo": {
                "owner": "acme",
                "repo": "widgets",
                "isPrivate": true,
                "defaultBranch": {"displayName": "main"},
                "branches": [{"displayName": "main"}, {"displayName": "dev"}]
            }
        }))
        .unwrap();

        let repo = source.github_repo.as_ref().unwrap();
        assert!(repo.is_private);
        assert_eq!(repo.default_branch.as_ref().unwrap().display_name, "main");
        assert_eq!(repo.branches.len(), 2);
        assert_eq!(source.full_name().as_deref(), Some("acme/widgets"));
    }

    #[test]
    fn test_source_context_wire_names() {
        let ctx = SourceContext {
            source: "sources/s1".into(),
            github_repo_context: Some(GitHubRepoContext {
                starting_branch: "main".into(),
            }),
        };
        assert_eq!(
            serde_json::to_value(&ctx).unwrap(),
            json!({"source": "sources/s1", "githubRepoContext": {"startingBranch": "main"}})
        );
        assert_eq!(ctx.starting_branch(), Some("main"));
    }

    #[test]
    fn test_source_context_without_branch() {
        let ctx = SourceContext {
            source: "sources/s1".into(),
            github_repo_context: None,
        };
        assert_eq!(
            serde_json::to_value(&ctx).unwrap(),
            json!({"source": "sources/s1"})
        );
        assert_eq!(ctx.starting_branch(), None);
    }
}
