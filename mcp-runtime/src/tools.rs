use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::client::{ApiCallResult, ApiRequest, FeedbackApi};
use crate::error::ToolError;
use crate::protocol::to_pretty_json;

const DEFAULT_DELETE_REASON: &str = "Deleted via MCP";

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Every tool the server exposes. `tools/list` and `tools/call` both derive
/// from this enum, so the two surfaces cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ListPosts,
    GetPost,
    CreatePost,
    EditPost,
    DeletePost,
    RespondToPost,
    ListComments,
    AddComment,
    UpdateComment,
    DeleteComment,
    ListTags,
    CreateTag,
    UpdateTag,
    DeleteTag,
    AssignTag,
    UnassignTag,
}

impl ToolKind {
    pub const ALL: [ToolKind; 16] = [
        ToolKind::ListPosts,
        ToolKind::GetPost,
        ToolKind::CreatePost,
        ToolKind::EditPost,
        ToolKind::DeletePost,
        ToolKind::RespondToPost,
        ToolKind::ListComments,
        ToolKind::AddComment,
        ToolKind::UpdateComment,
        ToolKind::DeleteComment,
        ToolKind::ListTags,
        ToolKind::CreateTag,
        ToolKind::UpdateTag,
        ToolKind::DeleteTag,
        ToolKind::AssignTag,
        ToolKind::UnassignTag,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::ListPosts => "list_posts",
            ToolKind::GetPost => "get_post",
            ToolKind::CreatePost => "create_post",
            ToolKind::EditPost => "edit_post",
            ToolKind::DeletePost => "delete_post",
            ToolKind::RespondToPost => "respond_to_post",
            ToolKind::ListComments => "list_comments",
            ToolKind::AddComment => "add_comment",
            ToolKind::UpdateComment => "update_comment",
            ToolKind::DeleteComment => "delete_comment",
            ToolKind::ListTags => "list_tags",
            ToolKind::CreateTag => "create_tag",
            ToolKind::UpdateTag => "update_tag",
            ToolKind::DeleteTag => "delete_tag",
            ToolKind::AssignTag => "assign_tag",
            ToolKind::UnassignTag => "unassign_tag",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn definition(self) -> ToolDefinition {
        let (description, input_schema) = match self {
            ToolKind::ListPosts => (
                "List posts from Fider with optional filtering",
                json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "Search keywords" },
                        "view": {
                            "type": "string",
                            "description": "Filter and order. Options: all, recent, my-votes, most-wanted, most-discussed, planned, started, completed, declined, trending",
                            "enum": ["all", "recent", "my-votes", "most-wanted", "most-discussed", "planned", "started", "completed", "declined", "trending"]
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Number of entries to return (default: 30)",
                            "minimum": 1,
                            "maximum": 100
                        },
                        "tags": { "type": "string", "description": "Comma-separated list of tags to filter by" }
                    }
                }),
            ),
            ToolKind::GetPost => (
                "Get a specific post by its number",
                json!({
                    "type": "object",
                    "properties": {
                        "number": { "type": "integer", "description": "The post number to retrieve" }
                    },
                    "required": ["number"]
                }),
            ),
            ToolKind::CreatePost => (
                "Create a new post (requires authentication)",
                json!({
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "description": "The title of the post" },
                        "description": { "type": "string", "description": "The description of the post" }
                    },
                    "required": ["title"]
                }),
            ),
            ToolKind::EditPost => (
                "Edit an existing post (requires collaborator/admin role)",
                json!({
                    "type": "object",
                    "properties": {
                        "number": { "type": "integer", "description": "The post number to edit" },
                        "title": { "type": "string", "description": "The new title of the post" },
                        "description": { "type": "string", "description": "The new description of the post" }
                    },
                    "required": ["number", "title"]
                }),
            ),
            ToolKind::DeletePost => (
                "Delete a post (requires admin role)",
                json!({
                    "type": "object",
                    "properties": {
                        "number": { "type": "integer", "description": "The post number to delete" },
                        "reason": { "type": "string", "description": "Reason for deletion" }
                    },
                    "required": ["number"]
                }),
            ),
            ToolKind::RespondToPost => (
                "Respond to a post by changing its status (requires collaborator/admin role)",
                json!({
                    "type": "object",
                    "properties": {
                        "number": { "type": "integer", "description": "The post number to respond to" },
                        "status": {
                            "type": "string",
                            "description": "The new status of the post",
                            "enum": PostStatus::ALL.map(PostStatus::as_str)
                        },
                        "text": { "type": "string", "description": "Optional description of the status change" },
                        "originalNumber": {
                            "type": "integer",
                            "description": "Required when status is 'duplicate' - the post number to merge into"
                        }
                    },
                    "required": ["number", "status"]
                }),
            ),
            ToolKind::ListComments => (
                "List comments for a specific post",
                json!({
                    "type": "object",
                    "properties": {
                        "number": { "type": "integer", "description": "The post number to get comments for" }
                    },
                    "required": ["number"]
                }),
            ),
            ToolKind::AddComment => (
                "Add a comment to a post (requires authentication)",
                json!({
                    "type": "object",
                    "properties": {
                        "number": { "type": "integer", "description": "The post number to comment on" },
                        "content": { "type": "string", "description": "The comment content" }
                    },
                    "required": ["number", "content"]
                }),
            ),
            ToolKind::UpdateComment => (
                "Update a comment (requires authentication and ownership)",
                json!({
                    "type": "object",
                    "properties": {
                        "post_number": { "type": "integer", "description": "The post number" },
                        "comment_id": { "type": "integer", "description": "The comment ID to update" },
                        "content": { "type": "string", "description": "The new comment content" }
                    },
                    "required": ["post_number", "comment_id", "content"]
                }),
            ),
            ToolKind::DeleteComment => (
                "Delete a comment (requires authentication and ownership/admin)",
                json!({
                    "type": "object",
                    "properties": {
                        "post_number": { "type": "integer", "description": "The post number" },
                        "comment_id": { "type": "integer", "description": "The comment ID to delete" }
                    },
                    "required": ["post_number", "comment_id"]
                }),
            ),
            ToolKind::ListTags => (
                "List all available tags",
                json!({
                    "type": "object",
                    "properties": {}
                }),
            ),
            ToolKind::CreateTag => (
                "Create a new tag (requires admin role)",
                json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "The tag name" },
                        "color": { "type": "string", "description": "The tag color (hex format, e.g., #FF0000)" },
                        "isPublic": { "type": "boolean", "description": "Whether the tag is public (default: true)" }
                    },
                    "required": ["name", "color"]
                }),
            ),
            ToolKind::UpdateTag => (
                "Update an existing tag (requires admin role)",
                json!({
                    "type": "object",
                    "properties": {
                        "slug": { "type": "string", "description": "The tag slug to update" },
                        "name": { "type": "string", "description": "The new tag name" },
                        "color": { "type": "string", "description": "The new tag color (hex format, e.g., #FF0000)" },
                        "isPublic": { "type": "boolean", "description": "Whether the tag is public" }
                    },
                    "required": ["slug", "name", "color"]
                }),
            ),
            ToolKind::DeleteTag => (
                "Delete a tag (requires admin role)",
                json!({
                    "type": "object",
                    "properties": {
                        "slug": { "type": "string", "description": "The tag slug to delete" }
                    },
                    "required": ["slug"]
                }),
            ),
            ToolKind::AssignTag => (
                "Assign a tag to a post (requires collaborator/admin role)",
                json!({
                    "type": "object",
                    "properties": {
                        "post_number": { "type": "integer", "description": "The post number" },
                        "slug": { "type": "string", "description": "The tag slug to assign" }
                    },
                    "required": ["post_number", "slug"]
                }),
            ),
            ToolKind::UnassignTag => (
                "Unassign a tag from a post (requires collaborator/admin role)",
                json!({
                    "type": "object",
                    "properties": {
                        "post_number": { "type": "integer", "description": "The post number" },
                        "slug": { "type": "string", "description": "The tag slug to unassign" }
                    },
                    "required": ["post_number", "slug"]
                }),
            ),
        };
        ToolDefinition {
            name: self.as_str(),
            description,
            input_schema,
        }
    }
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolKind::ALL.into_iter().map(ToolKind::definition).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Open,
    Planned,
    Started,
    Completed,
    Declined,
    Duplicate,
}

impl PostStatus {
    pub const ALL: [PostStatus; 6] = [
        PostStatus::Open,
        PostStatus::Planned,
        PostStatus::Started,
        PostStatus::Completed,
        PostStatus::Declined,
        PostStatus::Duplicate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Open => "open",
            PostStatus::Planned => "planned",
            PostStatus::Started => "started",
            PostStatus::Completed => "completed",
            PostStatus::Declined => "declined",
            PostStatus::Duplicate => "duplicate",
        }
    }

    fn parse(raw: &str) -> Result<Self, ToolError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.into_iter().map(Self::as_str).collect();
                ToolError::invalid(
                    "status",
                    format!("'{raw}' is not a valid status. Must be one of: {}", allowed.join(", ")),
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPostsParams {
    pub query: Option<String>,
    pub view: Option<String>,
    pub limit: Option<u64>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RespondParams {
    pub number: u64,
    pub status: PostStatus,
    pub text: Option<String>,
    pub original_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagParams {
    pub name: String,
    pub color: String,
    pub is_public: Option<bool>,
}

/// A validated invocation. Building one never touches the network.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    ListPosts(ListPostsParams),
    GetPost { number: u64 },
    CreatePost { title: String, description: Option<String> },
    EditPost { number: u64, title: String, description: Option<String> },
    DeletePost { number: u64, reason: Option<String> },
    RespondToPost(RespondParams),
    ListComments { number: u64 },
    AddComment { number: u64, content: String },
    UpdateComment { post_number: u64, comment_id: u64, content: String },
    DeleteComment { post_number: u64, comment_id: u64 },
    ListTags,
    CreateTag(TagParams),
    UpdateTag { slug: String, tag: TagParams },
    DeleteTag { slug: String },
    AssignTag { post_number: u64, slug: String },
    UnassignTag { post_number: u64, slug: String },
}

impl ToolCall {
    pub fn parse(kind: ToolKind, args: &Map<String, Value>) -> Result<Self, ToolError> {
        let call = match kind {
            ToolKind::ListPosts => ToolCall::ListPosts(ListPostsParams {
                query: arg_optional_string(args, "query")?,
                view: arg_optional_string(args, "view")?,
                limit: arg_optional_u64(args, "limit")?,
                tags: arg_optional_string(args, "tags")?,
            }),
            ToolKind::GetPost => ToolCall::GetPost {
                number: required_u64(args, "number", "Post number")?,
            },
            ToolKind::CreatePost => ToolCall::CreatePost {
                title: required_string(args, "title", "Post title")?,
                description: arg_optional_string(args, "description")?,
            },
            ToolKind::EditPost => ToolCall::EditPost {
                number: required_u64(args, "number", "Post number")?,
                title: required_string(args, "title", "Post title")?,
                description: arg_optional_string(args, "description")?,
            },
            ToolKind::DeletePost => ToolCall::DeletePost {
                number: required_u64(args, "number", "Post number")?,
                reason: arg_optional_string(args, "reason")?,
            },
            ToolKind::RespondToPost => {
                let number = required_u64(args, "number", "Post number")?;
                let status = PostStatus::parse(&required_string(args, "status", "Status")?)?;
                let original_number = arg_optional_u64(args, "originalNumber")?;
                if status == PostStatus::Duplicate && original_number.is_none() {
                    return Err(ToolError::invalid(
                        "originalNumber",
                        "originalNumber is required when status is 'duplicate'",
                    ));
                }
                ToolCall::RespondToPost(RespondParams {
                    number,
                    status,
                    text: arg_optional_string(args, "text")?,
                    original_number,
                })
            }
            ToolKind::ListComments => ToolCall::ListComments {
                number: required_u64(args, "number", "Post number")?,
            },
            ToolKind::AddComment => ToolCall::AddComment {
                number: required_u64(args, "number", "Post number")?,
                content: required_string(args, "content", "Comment content")?,
            },
            ToolKind::UpdateComment => ToolCall::UpdateComment {
                post_number: required_u64(args, "post_number", "Post number")?,
                comment_id: required_u64(args, "comment_id", "Comment ID")?,
                content: required_string(args, "content", "Comment content")?,
            },
            ToolKind::DeleteComment => ToolCall::DeleteComment {
                post_number: required_u64(args, "post_number", "Post number")?,
                comment_id: required_u64(args, "comment_id", "Comment ID")?,
            },
            ToolKind::ListTags => ToolCall::ListTags,
            ToolKind::CreateTag => ToolCall::CreateTag(tag_params(args)?),
            ToolKind::UpdateTag => {
                let slug = required_string(args, "slug", "Tag slug")?;
                ToolCall::UpdateTag {
                    slug,
                    tag: tag_params(args)?,
                }
            }
            ToolKind::DeleteTag => ToolCall::DeleteTag {
                slug: required_string(args, "slug", "Tag slug")?,
            },
            ToolKind::AssignTag => ToolCall::AssignTag {
                post_number: required_u64(args, "post_number", "Post number")?,
                slug: required_string(args, "slug", "Tag slug")?,
            },
            ToolKind::UnassignTag => ToolCall::UnassignTag {
                post_number: required_u64(args, "post_number", "Post number")?,
                slug: required_string(args, "slug", "Tag slug")?,
            },
        };
        Ok(call)
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::ListPosts(_) => ToolKind::ListPosts,
            ToolCall::GetPost { .. } => ToolKind::GetPost,
            ToolCall::CreatePost { .. } => ToolKind::CreatePost,
            ToolCall::EditPost { .. } => ToolKind::EditPost,
            ToolCall::DeletePost { .. } => ToolKind::DeletePost,
            ToolCall::RespondToPost(_) => ToolKind::RespondToPost,
            ToolCall::ListComments { .. } => ToolKind::ListComments,
            ToolCall::AddComment { .. } => ToolKind::AddComment,
            ToolCall::UpdateComment { .. } => ToolKind::UpdateComment,
            ToolCall::DeleteComment { .. } => ToolKind::DeleteComment,
            ToolCall::ListTags => ToolKind::ListTags,
            ToolCall::CreateTag(_) => ToolKind::CreateTag,
            ToolCall::UpdateTag { .. } => ToolKind::UpdateTag,
            ToolCall::DeleteTag { .. } => ToolKind::DeleteTag,
            ToolCall::AssignTag { .. } => ToolKind::AssignTag,
            ToolCall::UnassignTag { .. } => ToolKind::UnassignTag,
        }
    }

    /// The single HTTP call this invocation maps to.
    pub fn api_request(&self) -> ApiRequest {
        match self {
            ToolCall::ListPosts(params) => {
                let mut request = ApiRequest::get("/api/v1/posts");
                if let Some(query) = &params.query {
                    request = request.with_query("query", query.clone());
                }
                if let Some(view) = &params.view {
                    request = request.with_query("view", view.clone());
                }
                if let Some(limit) = params.limit {
                    request = request.with_query("limit", limit.to_string());
                }
                if let Some(tags) = &params.tags {
                    request = request.with_query("tags", tags.clone());
                }
                request
            }
            ToolCall::GetPost { number } => ApiRequest::get(format!("/api/v1/posts/{number}")),
            ToolCall::CreatePost { title, description } => ApiRequest::post("/api/v1/posts")
                .with_body(json!({
                    "title": title,
                    "description": description.as_deref().unwrap_or_default(),
                })),
            ToolCall::EditPost {
                number,
                title,
                description,
            } => ApiRequest::put(format!("/api/v1/posts/{number}")).with_body(json!({
                "title": title,
                "description": description.as_deref().unwrap_or_default(),
            })),
            ToolCall::DeletePost { number, reason } => {
                ApiRequest::delete(format!("/api/v1/posts/{number}")).with_body(json!({
                    "text": reason.as_deref().unwrap_or(DEFAULT_DELETE_REASON),
                }))
            }
            ToolCall::RespondToPost(params) => {
                let mut body = json!({
                    "status": params.status.as_str(),
                    "text": params.text.as_deref().unwrap_or_default(),
                });
                if let Some(original) = params.original_number {
                    body["originalNumber"] = json!(original);
                }
                ApiRequest::put(format!("/api/v1/posts/{}/status", params.number)).with_body(body)
            }
            ToolCall::ListComments { number } => {
                ApiRequest::get(format!("/api/v1/posts/{number}/comments"))
            }
            ToolCall::AddComment { number, content } => {
                ApiRequest::post(format!("/api/v1/posts/{number}/comments"))
                    .with_body(json!({ "content": content }))
            }
            ToolCall::UpdateComment {
                post_number,
                comment_id,
                content,
            } => ApiRequest::put(format!(
                "/api/v1/posts/{post_number}/comments/{comment_id}"
            ))
            .with_body(json!({ "content": content })),
            ToolCall::DeleteComment {
                post_number,
                comment_id,
            } => ApiRequest::delete(format!(
                "/api/v1/posts/{post_number}/comments/{comment_id}"
            )),
            ToolCall::ListTags => ApiRequest::get("/api/v1/tags"),
            ToolCall::CreateTag(tag) => ApiRequest::post("/api/v1/tags").with_body(tag.body()),
            ToolCall::UpdateTag { slug, tag } => ApiRequest::put("/api/v1/tags")
                .with_segment(slug)
                .with_body(tag.body()),
            ToolCall::DeleteTag { slug } => ApiRequest::delete("/api/v1/tags").with_segment(slug),
            ToolCall::AssignTag { post_number, slug } => {
                ApiRequest::post(format!("/api/v1/posts/{post_number}/tags")).with_segment(slug)
            }
            ToolCall::UnassignTag { post_number, slug } => {
                ApiRequest::delete(format!("/api/v1/posts/{post_number}/tags")).with_segment(slug)
            }
        }
    }

    fn summary(&self, body: &Value) -> String {
        match self {
            ToolCall::ListPosts(_) => {
                let count = body.as_array().map_or(0, Vec::len);
                format!("Found {count} posts:")
            }
            ToolCall::GetPost { number } => format!("Post #{number}:"),
            ToolCall::CreatePost { .. } => "Post created successfully:".to_string(),
            ToolCall::EditPost { number, .. } => format!("Post #{number} updated successfully"),
            ToolCall::DeletePost { number, .. } => format!("Post #{number} deleted successfully"),
            ToolCall::RespondToPost(params) => format!(
                "Post #{} status updated to '{}' successfully",
                params.number,
                params.status.as_str()
            ),
            ToolCall::ListComments { number } => format!("Comments for post #{number}:"),
            ToolCall::AddComment { number, .. } => {
                format!("Comment added successfully to post #{number}:")
            }
            ToolCall::UpdateComment { comment_id, .. } => {
                format!("Comment #{comment_id} updated successfully")
            }
            ToolCall::DeleteComment { comment_id, .. } => {
                format!("Comment #{comment_id} deleted successfully")
            }
            ToolCall::ListTags => "Available tags:".to_string(),
            ToolCall::CreateTag(_) => "Tag created successfully:".to_string(),
            ToolCall::UpdateTag { slug, .. } => format!("Tag '{slug}' updated successfully:"),
            ToolCall::DeleteTag { slug } => format!("Tag '{slug}' deleted successfully"),
            ToolCall::AssignTag { post_number, slug } => {
                format!("Tag '{slug}' assigned to post #{post_number} successfully")
            }
            ToolCall::UnassignTag { post_number, slug } => {
                format!("Tag '{slug}' unassigned from post #{post_number} successfully")
            }
        }
    }

    /// Map the remote response onto the tool result, or onto a failure.
    pub fn render(&self, response: &ApiCallResult) -> Result<Value, ToolError> {
        if let ToolCall::GetPost { number } = self {
            if response.status == 404 {
                return Err(ToolError::NotFound(format!("Post #{number}")));
            }
        }
        if !response.is_success() {
            return Err(ToolError::Remote {
                status: response.status,
                body: response.body_text(),
            });
        }

        let text = format!(
            "{}\n\n{}",
            self.summary(&response.body),
            to_pretty_json(&response.body)
        );
        Ok(json!({
            "content": [{
                "type": "text",
                "text": text
            }]
        }))
    }
}

impl TagParams {
    fn body(&self) -> Value {
        json!({
            "name": self.name,
            "color": self.color,
            "isPublic": self.is_public.unwrap_or(true),
        })
    }
}

/// Validate, issue the one HTTP call, and format the result.
pub async fn execute<A: FeedbackApi>(
    api: &A,
    kind: ToolKind,
    args: &Map<String, Value>,
) -> Result<Value, ToolError> {
    let call = ToolCall::parse(kind, args)?;
    let request = call.api_request();
    tracing::debug!(
        tool = call.kind().as_str(),
        method = %request.method,
        path = %request.path(),
        "invoking tool"
    );
    let response = api.send(request).await?;
    call.render(&response)
}

fn tag_params(args: &Map<String, Value>) -> Result<TagParams, ToolError> {
    Ok(TagParams {
        name: required_string(args, "name", "Tag name")?,
        color: required_string(args, "color", "Tag color")?,
        is_public: arg_optional_bool(args, "isPublic")?,
    })
}

fn required_string(
    args: &Map<String, Value>,
    key: &'static str,
    label: &'static str,
) -> Result<String, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Err(ToolError::missing(key, label)),
        Some(Value::String(v)) if v.trim().is_empty() => Err(ToolError::missing(key, label)),
        Some(Value::String(v)) => Ok(v.clone()),
        Some(_) => Err(ToolError::invalid(key, "must be a string")),
    }
}

fn arg_optional_string(
    args: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(v)) if v.trim().is_empty() => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.clone())),
        Some(_) => Err(ToolError::invalid(key, "must be a string")),
    }
}

fn arg_optional_bool(
    args: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<bool>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(v)) => Ok(Some(*v)),
        Some(_) => Err(ToolError::invalid(key, "must be a boolean")),
    }
}

/// Integers arrive as JSON numbers or numeric strings; zero counts as absent.
fn arg_optional_u64(
    args: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<u64>, ToolError> {
    let parsed = match args.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => match n.as_u64() {
            Some(v) => Some(v),
            None => match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Some(f as u64),
                _ => return Err(ToolError::invalid(key, "must be a positive integer")),
            },
        },
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(
            s.trim()
                .parse::<u64>()
                .map_err(|_| ToolError::invalid(key, "must be a positive integer"))?,
        ),
        Some(_) => return Err(ToolError::invalid(key, "must be a positive integer")),
    };
    Ok(parsed.filter(|v| *v != 0))
}

fn required_u64(
    args: &Map<String, Value>,
    key: &'static str,
    label: &'static str,
) -> Result<u64, ToolError> {
    arg_optional_u64(args, key)?.ok_or_else(|| ToolError::missing(key, label))
}
