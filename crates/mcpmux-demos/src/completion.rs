//! Completion for a prompt argument and a resource template variable.

use mcpmux_core::types::{
    CompleteRequest, Completion, CompletionRef, GetPromptResult, Prompt, ResourceContents,
    ResourceTemplate,
};
use mcpmux_server::{Server, ServerBuilder};

const REPO_TEMPLATE: &str = "github://repos/{owner}/{repo}";

const LANGUAGES: [&str; 5] = ["python", "javascript", "typescript", "go", "rust"];

const SDK_REPOS: [&str; 3] = ["python-sdk", "typescript-sdk", "specification"];

/// Suggest values for `request`; empty when nothing applies.
fn suggest(request: &CompleteRequest) -> Completion {
    let argument = &request.argument;
    match &request.reference {
        CompletionRef::Prompt { name } if name == "review_code" && argument.name == "language" => {
            Completion::from_values(
                LANGUAGES
                    .iter()
                    .filter(|lang| lang.starts_with(argument.value.as_str()))
                    .map(ToString::to_string)
                    .collect(),
            )
        }
        CompletionRef::Resource { uri } if uri == REPO_TEMPLATE && argument.name == "repo" => {
            if request.context_argument("owner") == Some("modelcontextprotocol") {
                Completion::from_values(SDK_REPOS.iter().map(ToString::to_string).collect())
            } else {
                Completion::default()
            }
        }
        _ => Completion::default(),
    }
}

/// The "Example" server.
#[must_use]
pub fn server() -> Server {
    ServerBuilder::new("Example", env!("CARGO_PKG_VERSION"))
        .resource_template(
            ResourceTemplate::new(REPO_TEMPLATE, "github_repo")
                .description("GitHub repository resource."),
            |req, _| async move {
                let owner = req.variable("owner").unwrap_or_default();
                let repo = req.variable("repo").unwrap_or_default();
                let text = format!("Repository: {owner}/{repo}");
                Ok(ResourceContents::text(req.uri, text))
            },
        )
        .prompt(
            Prompt::new("review_code")
                .description("Code review prompt")
                .required_arg("language")
                .required_arg("code"),
            |args, _| async move {
                let language = args.get("language").map_or("", String::as_str);
                let code = args.get("code").map_or("", String::as_str);
                Ok(GetPromptResult::user(format!("Review this {language} code:\n{code}")))
            },
        )
        .completion(|req, _| async move { Ok(suggest(&req)) })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpmux_core::types::{CompletionArgument, CompletionContext};
    use std::collections::HashMap;

    fn request(reference: CompletionRef, name: &str, value: &str) -> CompleteRequest {
        CompleteRequest {
            reference,
            argument: CompletionArgument {
                name: name.to_string(),
                value: value.to_string(),
            },
            context: None,
        }
    }

    #[test]
    fn test_language_prefix() {
        let completion = suggest(&request(CompletionRef::prompt("review_code"), "language", "ty"));
        assert_eq!(completion.values, vec!["typescript"]);

        let completion = suggest(&request(CompletionRef::prompt("review_code"), "code", ""));
        assert!(completion.values.is_empty());
    }

    #[test]
    fn test_repos_need_the_owner() {
        let mut req = request(CompletionRef::resource(REPO_TEMPLATE), "repo", "");
        assert!(suggest(&req).values.is_empty());

        req.context = Some(CompletionContext {
            arguments: HashMap::from([("owner".to_string(), "modelcontextprotocol".to_string())]),
        });
        assert_eq!(suggest(&req).values, SDK_REPOS.to_vec());
    }
}
