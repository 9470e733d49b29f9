//! In-memory GitHub for reconciler tests.
//!
//! Understands exactly the REST paths and GraphQL operations the reconcilers
//! send, keeps state between calls, and records every call in order.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use settle_api::{ApiError, ApiResult, GitHubApi, GraphQlErrorEntry, Method};

/// One recorded call: `("PUT", "repos/acme/api/collaborators/alice")` or
/// `("graphql", "createBranchProtectionRule")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub kind: String,
    pub target: String,
}

impl Call {
    pub fn rest(method: &str, path: &str) -> Self {
        Self {
            kind: method.to_string(),
            target: path.to_string(),
        }
    }

    pub fn graphql(operation: &str) -> Self {
        Self {
            kind: "graphql".to_string(),
            target: operation.to_string(),
        }
    }

    fn mentions(&self, fragment: &str) -> bool {
        self.kind.contains(fragment) || self.target.contains(fragment)
    }
}

#[derive(Debug, Clone)]
struct FakeRepo {
    collaborators: Vec<(String, String)>,
    teams: Vec<(String, String)>,
    rules: Vec<(String, String)>,
}

#[derive(Default)]
struct State {
    repos: BTreeMap<String, FakeRepo>,
    admins: Vec<String>,
    next_rule: u32,
    calls: Vec<(Call, Option<Value>)>,
}

/// Stateful stand-in for the GitHub API.
pub struct FakeGitHub {
    org: String,
    failures: Vec<String>,
    state: Mutex<State>,
}

impl FakeGitHub {
    pub fn new(org: &str) -> Self {
        Self {
            org: org.to_string(),
            failures: Vec::new(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_repo(self, name: &str) -> Self {
        self.state.lock().repos.insert(
            name.to_string(),
            FakeRepo {
                collaborators: Vec::new(),
                teams: Vec::new(),
                rules: Vec::new(),
            },
        );
        self
    }

    /// Adds a collaborator of the given account type (`User`, `Bot`).
    pub fn with_collaborator(self, repo: &str, login: &str, kind: &str) -> Self {
        self.edit(repo, |r| r.collaborators.push((login.into(), kind.into())));
        self
    }

    pub fn with_admin(self, login: &str) -> Self {
        self.state.lock().admins.push(login.to_string());
        self
    }

    pub fn with_team(self, repo: &str, name: &str, slug: &str) -> Self {
        self.edit(repo, |r| r.teams.push((name.into(), slug.into())));
        self
    }

    pub fn with_rule(self, repo: &str, id: &str, pattern: &str) -> Self {
        self.edit(repo, |r| r.rules.push((id.into(), pattern.into())));
        self
    }

    /// Fails every call whose method, path or operation contains `fragment`.
    pub fn fail_on(mut self, fragment: &str) -> Self {
        self.failures.push(fragment.to_string());
        self
    }

    pub fn repo_id(&self, name: &str) -> String {
        format!("R_{name}")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn calls_matching(&self, fragment: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.mentions(fragment)).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Body (REST) or variables (GraphQL) of the last call to `target`.
    pub fn last_body(&self, kind: &str, target: &str) -> Option<Value> {
        self.state
            .lock()
            .calls
            .iter()
            .rev()
            .find(|(c, _)| c.kind == kind && c.target == target)
            .and_then(|(_, body)| body.clone())
    }

    pub fn collaborators(&self, repo: &str) -> Vec<String> {
        self.read(repo, |r| r.collaborators.iter().map(|(l, _)| l.clone()).collect())
    }

    pub fn teams(&self, repo: &str) -> Vec<String> {
        self.read(repo, |r| r.teams.iter().map(|(_, s)| s.clone()).collect())
    }

    pub fn rule_patterns(&self, repo: &str) -> Vec<String> {
        self.read(repo, |r| r.rules.iter().map(|(_, p)| p.clone()).collect())
    }

    fn edit(&self, repo: &str, f: impl FnOnce(&mut FakeRepo)) {
        let mut state = self.state.lock();
        let repo = state.repos.get_mut(repo).expect("unknown fake repository");
        f(repo);
    }

    fn read<T>(&self, repo: &str, f: impl FnOnce(&FakeRepo) -> T) -> T {
        let state = self.state.lock();
        f(state.repos.get(repo).expect("unknown fake repository"))
    }

    fn record(&self, call: &Call, body: Option<Value>) -> ApiResult<()> {
        self.state.lock().calls.push((call.clone(), body));
        if self.failures.iter().any(|f| call.mentions(f)) {
            return Err(http_error(&call.kind, &call.target, 500, "injected failure"));
        }
        Ok(())
    }
}

fn http_error(method: &str, path: &str, status: u16, message: &str) -> ApiError {
    ApiError::Http {
        method: Method::from_bytes(method.as_bytes()).unwrap_or(Method::POST),
        url: format!("https://api.github.com/{path}"),
        status,
        message: message.to_string(),
    }
}

fn graphql_error(message: &str) -> ApiError {
    ApiError::GraphQl {
        errors: vec![GraphQlErrorEntry {
            kind: Some("NOT_FOUND".into()),
            path: None,
            message: message.to_string(),
        }],
    }
}

fn operation(query: &str) -> &'static str {
    const MUTATIONS: [&str; 4] = [
        "updateRepository",
        "createBranchProtectionRule",
        "updateBranchProtectionRule",
        "deleteBranchProtectionRule",
    ];
    MUTATIONS
        .into_iter()
        .find(|m| query.contains(m))
        .unwrap_or(if query.contains("branchProtectionRules") {
            "branchProtectionRules"
        } else {
            "repositoryId"
        })
}

fn var<'a>(variables: &'a Value, name: &str) -> &'a str {
    variables[name].as_str().unwrap_or_default()
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn rest(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Option<Value>> {
        let call = Call::rest(method.as_str(), path);
        self.record(&call, body)?;

        let (route, query) = path.split_once('?').unwrap_or((path, ""));
        let segments: Vec<&str> = route.split('/').collect();
        let not_found = || http_error(method.as_str(), path, 404, "Not Found");

        let mut state = self.state.lock();
        let org_ok = |org: &str| org == self.org;

        match (method.as_str(), segments.as_slice()) {
            ("GET", ["orgs", org, "members"]) if org_ok(*org) && query.contains("role=admin") => {
                let admins: Vec<_> = state
                    .admins
                    .iter()
                    .map(|login| json!({ "login": login, "type": "User" }))
                    .collect();
                Ok(Some(Value::Array(admins)))
            }
            ("PATCH", ["repos", org, repo]) if org_ok(*org) => {
                state.repos.get(*repo).ok_or_else(not_found)?;
                Ok(Some(json!({ "name": repo })))
            }
            ("GET", ["repos", org, repo, "collaborators"]) if org_ok(*org) => {
                let repo = state.repos.get(*repo).ok_or_else(not_found)?;
                let list: Vec<_> = repo
                    .collaborators
                    .iter()
                    .map(|(login, kind)| json!({ "login": login, "type": kind }))
                    .collect();
                Ok(Some(Value::Array(list)))
            }
            ("PUT", ["repos", org, repo, "collaborators", login]) if org_ok(*org) => {
                let repo = state.repos.get_mut(*repo).ok_or_else(not_found)?;
                if !repo.collaborators.iter().any(|(l, _)| l == *login) {
                    repo.collaborators.push((login.to_string(), "User".into()));
                }
                Ok(None)
            }
            ("DELETE", ["repos", org, repo, "collaborators", login]) if org_ok(*org) => {
                let repo = state.repos.get_mut(*repo).ok_or_else(not_found)?;
                repo.collaborators.retain(|(l, _)| l != *login);
                Ok(None)
            }
            ("GET", ["repos", org, repo, "teams"]) if org_ok(*org) => {
                let repo = state.repos.get(*repo).ok_or_else(not_found)?;
                let list: Vec<_> = repo
                    .teams
                    .iter()
                    .map(|(name, slug)| json!({ "name": name, "slug": slug }))
                    .collect();
                Ok(Some(Value::Array(list)))
            }
            ("PUT", ["orgs", org, "teams", slug, "repos", owner, repo])
                if org_ok(*org) && org_ok(*owner) =>
            {
                let repo = state.repos.get_mut(*repo).ok_or_else(not_found)?;
                if !repo.teams.iter().any(|(_, s)| s == *slug) {
                    repo.teams.push((slug.to_string(), slug.to_string()));
                }
                Ok(None)
            }
            ("DELETE", ["orgs", org, "teams", slug, "repos", owner, repo])
                if org_ok(*org) && org_ok(*owner) =>
            {
                let repo = state.repos.get_mut(*repo).ok_or_else(not_found)?;
                repo.teams.retain(|(_, s)| s != *slug);
                Ok(None)
            }
            _ => Err(not_found()),
        }
    }

    async fn graphql(&self, query: &str, variables: Value) -> ApiResult<Value> {
        let op = operation(query);
        self.record(&Call::graphql(op), Some(variables.clone()))?;

        let mut state = self.state.lock();
        let repo_by_id = |id: &str| id.strip_prefix("R_").map(str::to_string);

        match op {
            "repositoryId" => {
                if var(&variables, "org") != self.org {
                    return Ok(json!({ "organization": null }));
                }
                let name = var(&variables, "name");
                let repository = state
                    .repos
                    .contains_key(name)
                    .then(|| json!({ "id": self.repo_id(name) }));
                Ok(json!({ "organization": { "repository": repository } }))
            }
            "branchProtectionRules" => {
                if var(&variables, "org") != self.org {
                    return Ok(json!({ "organization": null }));
                }
                let repository = state.repos.get(var(&variables, "name")).map(|repo| {
                    let nodes: Vec<_> = repo
                        .rules
                        .iter()
                        .map(|(id, pattern)| json!({ "id": id, "pattern": pattern }))
                        .collect();
                    json!({ "branchProtectionRules": { "nodes": nodes } })
                });
                Ok(json!({ "organization": { "repository": repository } }))
            }
            "updateRepository" => {
                let known = repo_by_id(var(&variables, "id"))
                    .is_some_and(|name| state.repos.contains_key(&name));
                if !known {
                    return Err(graphql_error("Could not resolve to a Repository"));
                }
                Ok(json!({ "updateRepository": { "clientMutationId": null } }))
            }
            "createBranchProtectionRule" => {
                state.next_rule += 1;
                let id = format!("BPR_{}", state.next_rule);
                let name = repo_by_id(var(&variables, "repositoryId"))
                    .ok_or_else(|| graphql_error("Could not resolve to a Repository"))?;
                let repo = state
                    .repos
                    .get_mut(&name)
                    .ok_or_else(|| graphql_error("Could not resolve to a Repository"))?;
                repo.rules.push((id, var(&variables, "pattern").to_string()));
                Ok(json!({ "createBranchProtectionRule": { "clientMutationId": null } }))
            }
            "updateBranchProtectionRule" => {
                let id = var(&variables, "branchProtectionRuleId");
                let rule = state
                    .repos
                    .values_mut()
                    .flat_map(|repo| repo.rules.iter_mut())
                    .find(|(rule_id, _)| rule_id == id)
                    .ok_or_else(|| graphql_error("Could not resolve to a BranchProtectionRule"))?;
                rule.1 = var(&variables, "pattern").to_string();
                Ok(json!({ "updateBranchProtectionRule": { "clientMutationId": null } }))
            }
            "deleteBranchProtectionRule" => {
                let id = var(&variables, "branchProtectionRuleId");
                let repo = state
                    .repos
                    .values_mut()
                    .find(|repo| repo.rules.iter().any(|(rule_id, _)| rule_id == id))
                    .ok_or_else(|| graphql_error("Could not resolve to a BranchProtectionRule"))?;
                repo.rules.retain(|(rule_id, _)| rule_id != id);
                Ok(json!({ "deleteBranchProtectionRule": { "clientMutationId": null } }))
            }
            _ => Err(graphql_error("unsupported operation")),
        }
    }
}
