//! MCP server implementation for grademap.
//!
//! Translates tool calls into typed engine requests and engine errors into
//! JSON-RPC errors: lookup and validation failures become invalid-params
//! (-32602) with the failing field in the message, so a caller can always
//! tell "unknown filter value" from "valid filter, zero matches".
//! Truncation via `limit` happens here, after ranking - the engine always
//! returns the full ordered candidate set.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ErrorCode, ErrorData as McpError, *},
    tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::aggregate::GroupBy;
use crate::engine::GradesEngine;
use crate::error::QueryError;
use crate::query::{CourseQuery, ProfessorQuery, SortHint};
use crate::types::Level;

/// Default result-set truncation when the caller gives no limit.
const DEFAULT_LIMIT: usize = 20;

/// grademap MCP server - exposes the grade-query engine as MCP tools.
#[derive(Clone)]
pub struct GradesServer {
    engine: Arc<GradesEngine>,
    tool_router: ToolRouter<GradesServer>,
}

/// Request parameters for the search_courses tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchCoursesRequest {
    /// Department code or full name.
    #[schemars(description = "Department code or full name, e.g. \"CSCI\" or \"Computer Science\"")]
    pub department: Option<String>,

    /// Inclusive lower bound on the course number.
    #[schemars(description = "Inclusive lower bound on the numeric course number, e.g. 4000")]
    pub number_min: Option<u32>,

    /// Inclusive upper bound on the course number.
    #[schemars(description = "Inclusive upper bound on the numeric course number, e.g. 5999")]
    pub number_max: Option<u32>,

    /// Course level, derived from number magnitude.
    #[schemars(description = "Course level: undergraduate (1xxx-4xxx), masters (5xxx-6xxx) or doctoral (7xxx+)")]
    pub level: Option<Level>,

    /// Minimum aggregate GPA across all sections.
    #[schemars(description = "Minimum aggregate GPA (0.0-4.333). Courses without a computable GPA are excluded.")]
    pub min_gpa: Option<f64>,

    /// Liberal-education tag the course must satisfy.
    #[schemars(description = "Liberal-education requirement the course must satisfy")]
    pub liberal_ed_tag: Option<String>,

    /// Fuzzy free-text keyword matched against titles and codes.
    #[schemars(description = "Free-text keyword matched fuzzily against course titles and codes, e.g. \"machine learning\"")]
    pub keyword: Option<String>,

    /// Ordering when no keyword is given.
    #[schemars(description = "Sort order when no keyword is given: identifier, gpa-desc, number-asc or enrollment-desc")]
    pub sort: Option<SortHint>,

    /// Maximum number of results.
    #[schemars(description = "Maximum number of results to return (default: 20)")]
    pub limit: Option<usize>,
}

/// Request parameters for the get_grades_of_a_course tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CourseGradesRequest {
    /// Department code or full name.
    #[schemars(description = "Department code or full name, e.g. \"CSCI\"")]
    pub department: String,

    /// Catalog course number.
    #[schemars(description = "Course number, e.g. \"5511\" or \"1001W\"")]
    pub number: String,

    /// Optional partitioning of the report.
    #[schemars(description = "Partition the report: none (overall), professor, or term")]
    pub group_by: Option<GroupBy>,
}

/// Request parameters for the search_professors tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchProfessorsRequest {
    /// Name or partial name, fuzzily matched.
    #[schemars(description = "Professor name or partial name, matched fuzzily (handles typos)")]
    pub name_fragment: Option<String>,

    /// Exact professor id.
    #[schemars(description = "Exact professor id, if known")]
    pub id: Option<u32>,

    /// Minimum external rating.
    #[schemars(description = "Minimum external rating (0-5). Unrated professors are excluded.")]
    pub min_rating: Option<f64>,

    /// Ordering when no name fragment is given.
    #[schemars(description = "Sort order when no name fragment is given: identifier, rating-desc, gpa-desc or enrollment-desc")]
    pub sort: Option<SortHint>,

    /// Maximum number of results.
    #[schemars(description = "Maximum number of results to return (default: 20)")]
    pub limit: Option<usize>,
}

/// Request parameters for the get_grades_of_a_professor tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfessorGradesRequest {
    /// The professor's id.
    #[schemars(description = "The professor's id")]
    pub id: u32,

    /// Optional partitioning of the report.
    #[schemars(description = "Partition the report: none (overall), professor, or term")]
    pub group_by: Option<GroupBy>,
}

/// Request parameters for the get_liberal_education_courses tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LibEdCoursesRequest {
    /// The requirement's tag, case-insensitive.
    #[schemars(description = "Liberal-education requirement tag, e.g. \"Writing Intensive\"")]
    pub tag: String,
}

/// Request parameters for the get_abbreviations_and_terms tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListAbbreviationsRequest {}

/// Count-wrapped result list, matching the shape callers paginate over.
#[derive(Debug, Serialize)]
struct Listing<T> {
    count: usize,
    results: Vec<T>,
}

fn invalid_params(err: QueryError) -> McpError {
    McpError {
        code: ErrorCode(-32602),
        message: Cow::from(err.to_string()),
        data: None,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError {
        code: ErrorCode(-32603),
        message: Cow::from(format!("JSON serialization failed: {}", e)),
        data: None,
    })?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn truncate<T>(mut results: Vec<T>, limit: Option<usize>) -> Listing<T> {
    results.truncate(limit.unwrap_or(DEFAULT_LIMIT));
    Listing {
        count: results.len(),
        results,
    }
}

#[tool_router]
impl GradesServer {
    /// Create a server over a shared engine snapshot.
    pub fn new(engine: Arc<GradesEngine>) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "search_courses",
        description = "Search courses by department, number range, level, minimum GPA, liberal-education requirement and/or fuzzy keyword. Returns ranked courses with aggregate grade statistics."
    )]
    async fn search_courses(
        &self,
        Parameters(request): Parameters<SearchCoursesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let query = CourseQuery {
            department: request.department,
            number_min: request.number_min,
            number_max: request.number_max,
            level: request.level,
            min_gpa: request.min_gpa,
            liberal_ed_tag: request.liberal_ed_tag,
            keyword: request.keyword,
            sort: request.sort,
            ..Default::default()
        };
        let hits = self.engine.search_courses(&query).map_err(invalid_params)?;
        to_json(&truncate(hits, request.limit))
    }

    #[tool(
        name = "get_grades_of_a_course",
        description = "Get the grade distribution and statistics for one course, overall or partitioned by professor or term, plus the liberal-education requirements it satisfies."
    )]
    async fn get_grades_of_a_course(
        &self,
        Parameters(request): Parameters<CourseGradesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let report = self
            .engine
            .course_grades(
                &request.department,
                &request.number,
                request.group_by.unwrap_or_default(),
            )
            .map_err(invalid_params)?;
        to_json(&report)
    }

    #[tool(
        name = "search_professors",
        description = "Search professors by name fragment or id, optionally filtered by minimum external rating. Returns ranked professors with aggregate grade statistics and the courses they have taught."
    )]
    async fn search_professors(
        &self,
        Parameters(request): Parameters<SearchProfessorsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let query = ProfessorQuery {
            name_fragment: request.name_fragment,
            id: request.id,
            min_rating: request.min_rating,
            sort: request.sort,
        };
        let hits = self
            .engine
            .search_professors(&query)
            .map_err(invalid_params)?;
        to_json(&truncate(hits, request.limit))
    }

    #[tool(
        name = "get_grades_of_a_professor",
        description = "Get one professor's grade statistics across everything they have taught, overall or partitioned by term, with distinct-course and total-student counts."
    )]
    async fn get_grades_of_a_professor(
        &self,
        Parameters(request): Parameters<ProfessorGradesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let report = self
            .engine
            .professor_grades(request.id, request.group_by.unwrap_or_default())
            .map_err(invalid_params)?;
        to_json(&report)
    }

    #[tool(
        name = "get_liberal_education_courses",
        description = "List the courses satisfying a liberal-education requirement, in canonical catalog order."
    )]
    async fn get_liberal_education_courses(
        &self,
        Parameters(request): Parameters<LibEdCoursesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let listing = self
            .engine
            .liberal_education_courses(&request.tag)
            .map_err(invalid_params)?;
        to_json(&listing)
    }

    #[tool(
        name = "get_abbreviations_and_terms",
        description = "List every department code with its full name and every term code with its label, sorted by code."
    )]
    async fn get_abbreviations_and_terms(
        &self,
        Parameters(_request): Parameters<ListAbbreviationsRequest>,
    ) -> Result<CallToolResult, McpError> {
        to_json(&self.engine.abbreviations_and_terms())
    }
}

#[tool_handler]
impl ServerHandler for GradesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "grademap".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "Structured queries over university course offerings and \
                 instructor grade history. Use search_courses and \
                 search_professors for ranked discovery, the get_grades_* \
                 tools for aggregated distributions, and \
                 get_abbreviations_and_terms to resolve codes."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::sample_dataset;
    use crate::index::CatalogIndex;
    use crate::rank::RankWeights;

    fn server() -> GradesServer {
        let index = CatalogIndex::build(sample_dataset()).unwrap();
        let engine = Arc::new(GradesEngine::new(index, RankWeights::default()));
        GradesServer::new(engine)
    }

    #[test]
    fn test_server_creation() {
        let server = server();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "grademap");
    }

    #[tokio::test]
    async fn test_unknown_course_maps_to_invalid_params() {
        let server = server();
        let request = CourseGradesRequest {
            department: "ZZZZ".to_string(),
            number: "1001".to_string(),
            group_by: None,
        };
        let err = server
            .get_grades_of_a_course(Parameters(request))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode(-32602));
        assert!(err.message.contains("department"));
    }

    #[tokio::test]
    async fn test_search_courses_applies_limit() {
        let server = server();
        let request = SearchCoursesRequest {
            department: None,
            number_min: None,
            number_max: None,
            level: None,
            min_gpa: None,
            liberal_ed_tag: None,
            keyword: None,
            sort: None,
            limit: Some(1),
        };
        let result = server.search_courses(Parameters(request)).await.unwrap();
        let text = match &result.content[0].raw {
            RawContent::Text(t) => &t.text,
            other => panic!("expected text content, got {other:?}"),
        };
        let value: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["results"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_request_rejects_unknown_fields() {
        let err =
            serde_json::from_str::<SearchCoursesRequest>(r#"{"dept_abbr": "CSCI"}"#);
        assert!(err.is_err());
    }
}
