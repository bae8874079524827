//! The row-operation orchestrator.
//!
//! One `TableService` per bound table: it owns pagination and batching and
//! is the only component that talks to the transport. It holds no mutable
//! state beyond the immutable binding, so independent operations may run
//! concurrently from the caller's side.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use crate::domain::field::{Row, RowId};
use crate::domain::filter::Filter;
use crate::domain::reconcile::{reconcile, ReconciliationReport, RemoteField};
use crate::domain::schema::{RowValues, TableBinding};
use crate::error::{GridError, GridResult};
use crate::transport::{Method, Transport};

/// Hard upper bound the server puts on one page.
pub const MAX_PAGE_SIZE: u32 = 200;
/// Page size used internally by `list_all`.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Maximum number of items in one batch mutation request.
pub const MAX_BATCH_SIZE: usize = 200;

/// Parameters of one `list` call.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub filter: Option<Filter>,
    /// Field names, `+` (default) for ascending and `-` for descending.
    pub order_by: Vec<String>,
    pub search: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl ListRequest {
    pub fn new() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}

/// One page of typed rows.
#[derive(Debug, Clone)]
pub struct RowPage {
    pub rows: Vec<Row>,
    /// Whether the server reports a further page.
    pub has_next: bool,
    /// Total number of rows matching the query, across all pages.
    pub total_count: u64,
}

/// Row operations against one bound table. Every call maps to exactly one
/// remote request (or one ordered sequence of batch/page requests); results
/// are authoritative, failures surface immediately.
pub struct TableService {
    transport: Arc<dyn Transport>,
    binding: TableBinding,
}

impl TableService {
    pub fn new(transport: Arc<dyn Transport>, binding: TableBinding) -> Self {
        Self { transport, binding }
    }

    pub fn binding(&self) -> &TableBinding {
        &self.binding
    }

    fn rows_path(&self) -> String {
        format!("api/database/rows/table/{}/", self.binding.table_id())
    }

    fn row_path(&self, row_id: RowId) -> String {
        format!(
            "api/database/rows/table/{}/{}/",
            self.binding.table_id(),
            row_id
        )
    }

    fn batch_path(&self) -> String {
        format!("{}batch/", self.rows_path())
    }

    fn batch_delete_path(&self) -> String {
        format!("{}batch-delete/", self.rows_path())
    }

    fn fields_path(&self) -> String {
        format!("api/database/fields/table/{}/", self.binding.table_id())
    }

    /// Rows are addressed by the names declared in the schema, not by
    /// server-side field ids.
    fn base_query(&self) -> Vec<(String, String)> {
        vec![("user_field_names".to_string(), "true".to_string())]
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<JsonValue>,
    ) -> GridResult<Option<JsonValue>> {
        let response = self.transport.request(method, path, &query, body).await?;
        tracing::debug!(
            table = self.binding.name(),
            method = method.as_str(),
            path,
            status = response.status,
            "table operation"
        );
        if !response.is_success() {
            return Err(GridError::Remote {
                status: response.status,
                detail: response.body,
            });
        }
        Ok(response.body)
    }

    async fn send_expect_body(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<JsonValue>,
    ) -> GridResult<JsonValue> {
        self.send(method, path, query, body)
            .await?
            .ok_or_else(|| GridError::UnexpectedResponse {
                detail: "success response without a body".to_string(),
            })
    }

    fn list_query(
        &self,
        filter: Option<&Filter>,
        order_by: &[String],
        search: Option<&str>,
        page: u32,
        size: u32,
    ) -> GridResult<Vec<(String, String)>> {
        let mut query = self.base_query();
        query.push(("page".to_string(), page.to_string()));
        query.push(("size".to_string(), size.to_string()));
        if let Some(filter) = filter {
            query.push(("filters".to_string(), serde_json::to_string(filter)?));
        }
        if !order_by.is_empty() {
            query.push(("order_by".to_string(), order_by.join(",")));
        }
        if let Some(term) = search {
            query.push(("search".to_string(), term.to_string()));
        }
        Ok(query)
    }

    fn decode_page(&self, body: &JsonValue) -> GridResult<RowPage> {
        let results = body
            .get("results")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| GridError::UnexpectedResponse {
                detail: "list response without a 'results' array".to_string(),
            })?;
        let rows = results
            .iter()
            .map(|item| self.binding.schema().decode_row(item))
            .collect::<GridResult<Vec<_>>>()?;
        let has_next = body.get("next").map(|v| !v.is_null()).unwrap_or(false);
        let total_count = body
            .get("count")
            .and_then(JsonValue::as_u64)
            .unwrap_or(rows.len() as u64);
        Ok(RowPage {
            rows,
            has_next,
            total_count,
        })
    }

    /// Number of rows matching the filter. Single request.
    pub async fn count(&self, filter: Option<&Filter>) -> GridResult<u64> {
        let query = self.list_query(filter, &[], None, 1, 1)?;
        let body = self
            .send_expect_body(Method::Get, &self.rows_path(), query, None)
            .await?;
        body.get("count")
            .and_then(JsonValue::as_u64)
            .ok_or_else(|| GridError::UnexpectedResponse {
                detail: "list response without a 'count' field".to_string(),
            })
    }

    /// Fetches a single row by id.
    pub async fn get(&self, row_id: RowId) -> GridResult<Row> {
        let body = self
            .send_expect_body(Method::Get, &self.row_path(row_id), self.base_query(), None)
            .await?;
        self.binding.schema().decode_row(&body)
    }

    /// Fetches one page of rows. The page size must be within 1..=200;
    /// out-of-range sizes are rejected, not clamped.
    pub async fn list(&self, request: ListRequest) -> GridResult<RowPage> {
        if request.size == 0 || request.size > MAX_PAGE_SIZE {
            return Err(GridError::InvalidPageSize {
                size: request.size as i64,
            });
        }
        let query = self.list_query(
            request.filter.as_ref(),
            &request.order_by,
            request.search.as_deref(),
            request.page.max(1),
            request.size,
        )?;
        let body = self
            .send_expect_body(Method::Get, &self.rows_path(), query, None)
            .await?;
        self.decode_page(&body)
    }

    /// Lazily iterates over every row matching the query, resolving the
    /// server's paging as it goes.
    ///
    /// Pages are fetched sequentially on demand at a fixed internal size;
    /// dropping the pager early stops fetching. With large tables this
    /// issues an unbounded number of requests — one per page — so use it
    /// deliberately.
    pub fn list_all(&self, filter: Option<Filter>, order_by: Vec<String>) -> RowPager<'_> {
        RowPager {
            service: self,
            filter,
            order_by,
            next_page: 1,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Creates rows, preserving input order in the result. One row is sent
    /// as a single request; more are grouped into ordered batch requests of
    /// at most `MAX_BATCH_SIZE` items. All rows are encoded (and validated)
    /// before the first request is sent.
    pub async fn create(&self, rows: Vec<RowValues>) -> GridResult<Vec<Row>> {
        let schema = self.binding.schema();
        let mut items = Vec::with_capacity(rows.len());
        for values in &rows {
            items.push(JsonValue::Object(values.encode(schema)?));
        }

        if items.is_empty() {
            return Ok(Vec::new());
        }
        if items.len() == 1 {
            let body = self
                .send_expect_body(
                    Method::Post,
                    &self.rows_path(),
                    self.base_query(),
                    Some(items.remove(0)),
                )
                .await?;
            return Ok(vec![schema.decode_row(&body)?]);
        }

        let mut created = Vec::with_capacity(items.len());
        for chunk in items.chunks(MAX_BATCH_SIZE) {
            let body = self
                .send_expect_body(
                    Method::Post,
                    &self.batch_path(),
                    self.base_query(),
                    Some(json!({ "items": chunk })),
                )
                .await?;
            let batch = body
                .get("items")
                .and_then(JsonValue::as_array)
                .ok_or_else(|| GridError::UnexpectedResponse {
                    detail: "batch response without an 'items' array".to_string(),
                })?;
            for item in batch {
                created.push(schema.decode_row(item)?);
            }
        }
        Ok(created)
    }

    /// Creates a single row.
    pub async fn create_one(&self, values: RowValues) -> GridResult<Row> {
        let mut created = self.create(vec![values]).await?;
        created.pop().ok_or_else(|| GridError::UnexpectedResponse {
            detail: "create returned no row".to_string(),
        })
    }

    /// Updates one row. A partial payload patches only the supplied fields;
    /// a payload built with `RowValues::full_from_row` overwrites every
    /// writable schema field.
    pub async fn update(&self, row_id: RowId, values: &RowValues) -> GridResult<Row> {
        let encoded = values.encode(self.binding.schema())?;
        let body = self
            .send_expect_body(
                Method::Patch,
                &self.row_path(row_id),
                self.base_query(),
                Some(JsonValue::Object(encoded)),
            )
            .await?;
        self.binding.schema().decode_row(&body)
    }

    /// Deletes rows by id, batched like `create` when more than one id is
    /// given. Success carries no content.
    pub async fn delete(&self, row_ids: &[RowId]) -> GridResult<()> {
        match row_ids {
            [] => Ok(()),
            [row_id] => {
                self.send(Method::Delete, &self.row_path(*row_id), Vec::new(), None)
                    .await?;
                Ok(())
            }
            many => {
                for chunk in many.chunks(MAX_BATCH_SIZE) {
                    self.send(
                        Method::Post,
                        &self.batch_delete_path(),
                        Vec::new(),
                        Some(json!({ "items": chunk })),
                    )
                    .await?;
                }
                Ok(())
            }
        }
    }

    /// Fetches the remote table's field metadata.
    pub async fn remote_fields(&self) -> GridResult<Vec<RemoteField>> {
        let body = self
            .send_expect_body(Method::Get, &self.fields_path(), Vec::new(), None)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fetches the live field list and reconciles it against the declared
    /// schema. Call this explicitly (e.g. once at startup); it is never run
    /// implicitly per operation.
    pub async fn validate_schema(&self) -> GridResult<ReconciliationReport> {
        let remote = self.remote_fields().await?;
        Ok(reconcile(self.binding.schema(), &remote))
    }
}

/// Lazy, forward-only, non-restartable row sequence produced by
/// `TableService::list_all`. Page N+1 is requested only after page N has
/// been drained; consuming stops fetching as soon as the pager is dropped.
pub struct RowPager<'a> {
    service: &'a TableService,
    filter: Option<Filter>,
    order_by: Vec<String>,
    next_page: u32,
    buffer: VecDeque<Row>,
    exhausted: bool,
}

impl<'a> RowPager<'a> {
    /// Yields the next row, fetching the next page when the buffered one is
    /// drained. Returns `Ok(None)` once the server reports no further page.
    pub async fn next(&mut self) -> GridResult<Option<Row>> {
        while self.buffer.is_empty() && !self.exhausted {
            let query = self.service.list_query(
                self.filter.as_ref(),
                &self.order_by,
                None,
                self.next_page,
                DEFAULT_PAGE_SIZE,
            )?;
            let body = self
                .service
                .send_expect_body(Method::Get, &self.service.rows_path(), query, None)
                .await?;
            let page = self.service.decode_page(&body)?;
            self.next_page += 1;
            self.exhausted = !page.has_next;
            self.buffer.extend(page.rows);
            if self.buffer.is_empty() {
                break;
            }
        }
        Ok(self.buffer.pop_front())
    }

    /// Drains the pager into a vector, fetching every remaining page.
    pub async fn collect_all(mut self) -> GridResult<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}
