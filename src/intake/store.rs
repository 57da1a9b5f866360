use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use super::errors::{IntakeError, IntakeResult};
use super::models::{
    CertificationDetails, CertificationDetailsPayload, LabSelection, LabSelectionPayload,
    ProductDetails, ProductDetailsPayload, Region, RequestRecord, Requirements,
    RequirementsPayload, Standards, StandardsPayload, TechnicalDocument,
};
use crate::workflows::{RequestStatus, Workflow};

/// A document row about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub doc_type: String,
    pub file_name: String,
    pub file_path: Option<String>,
    pub file_size: i64,
    pub display_order: i64,
}

/// Row-level access to the intake tables
///
/// Singleton step tables carry `UNIQUE(request_id)` and are written with
/// `ON CONFLICT DO UPDATE`, so concurrent saves for one request converge on a
/// single row instead of racing a lookup against an insert.
#[derive(Debug, Clone)]
pub struct RequestStore {
    pool: SqlitePool,
}

impl RequestStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_request(
        &self,
        workflow: Workflow,
        status: RequestStatus,
    ) -> IntakeResult<RequestRecord> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO intake_requests (workflow, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
        )
        .bind(workflow.as_str())
        .bind(status.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(RequestRecord {
            id: result.last_insert_rowid(),
            workflow,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    /// Look up a request; a row belonging to another workflow is treated as absent
    pub async fn find_request(
        &self,
        workflow: Workflow,
        id: i64,
    ) -> IntakeResult<Option<RequestRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, workflow, status, created_at, updated_at
            FROM intake_requests
            WHERE id = ?1 AND workflow = ?2
            "#,
        )
        .bind(id)
        .bind(workflow.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(request_from_row).transpose()
    }

    /// Drafts of one workflow, newest first
    pub async fn list_drafts(&self, workflow: Workflow) -> IntakeResult<Vec<RequestRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, workflow, status, created_at, updated_at
            FROM intake_requests
            WHERE workflow = ?1 AND status = 'draft'
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(workflow.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(request_from_row).collect()
    }

    pub async fn latest_draft(&self, workflow: Workflow) -> IntakeResult<Option<RequestRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, workflow, status, created_at, updated_at
            FROM intake_requests
            WHERE workflow = ?1 AND status = 'draft'
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(workflow.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(request_from_row).transpose()
    }

    /// Delete a request row; child rows go with it through the cascade
    pub async fn delete_request(&self, id: i64) -> IntakeResult<bool> {
        let result = sqlx::query("DELETE FROM intake_requests WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn touch_request(&self, id: i64) -> IntakeResult<()> {
        let mut conn = self.pool.acquire().await?;
        touch(&mut conn, id).await
    }

    pub async fn upsert_product(&self, id: i64, payload: &ProductDetailsPayload) -> IntakeResult<()> {
        let dimensions = payload.dimensions.clone().unwrap_or_default();
        sqlx::query(
            r#"
            INSERT INTO product_details (
                request_id, eut_name, eut_quantity, manufacturer, model_no, serial_no,
                supply_voltage, operating_frequency, rated_current, weight,
                length_mm, width_mm, height_mm, power_ports, signal_lines,
                software_name, software_version, industry, industry_other,
                preferred_date, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20, ?21)
            ON CONFLICT(request_id) DO UPDATE SET
                eut_name = excluded.eut_name,
                eut_quantity = excluded.eut_quantity,
                manufacturer = excluded.manufacturer,
                model_no = excluded.model_no,
                serial_no = excluded.serial_no,
                supply_voltage = excluded.supply_voltage,
                operating_frequency = excluded.operating_frequency,
                rated_current = excluded.rated_current,
                weight = excluded.weight,
                length_mm = excluded.length_mm,
                width_mm = excluded.width_mm,
                height_mm = excluded.height_mm,
                power_ports = excluded.power_ports,
                signal_lines = excluded.signal_lines,
                software_name = excluded.software_name,
                software_version = excluded.software_version,
                industry = excluded.industry,
                industry_other = excluded.industry_other,
                preferred_date = excluded.preferred_date,
                notes = excluded.notes
            "#,
        )
        .bind(id)
        .bind(&payload.eut_name)
        .bind(&payload.eut_quantity)
        .bind(&payload.manufacturer)
        .bind(&payload.model_no)
        .bind(&payload.serial_no)
        .bind(&payload.supply_voltage)
        .bind(&payload.operating_frequency)
        .bind(&payload.current)
        .bind(&payload.weight)
        .bind(&dimensions.length)
        .bind(&dimensions.width)
        .bind(&dimensions.height)
        .bind(&payload.power_ports)
        .bind(&payload.signal_lines)
        .bind(&payload.software_name)
        .bind(&payload.software_version)
        .bind(Json(&payload.industry))
        .bind(&payload.industry_other)
        .bind(&payload.preferred_date)
        .bind(&payload.notes)
        .execute(&self.pool)
        .await?;

        debug!(request_id = id, "Product details upserted");
        Ok(())
    }

    pub async fn find_product(&self, id: i64) -> IntakeResult<Option<ProductDetails>> {
        let row = sqlx::query("SELECT * FROM product_details WHERE request_id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> IntakeResult<ProductDetails> {
            Ok(ProductDetails {
                id: row.try_get("id")?,
                eut_name: row.try_get("eut_name")?,
                eut_quantity: row.try_get("eut_quantity")?,
                manufacturer: row.try_get("manufacturer")?,
                model_no: row.try_get("model_no")?,
                serial_no: row.try_get("serial_no")?,
                supply_voltage: row.try_get("supply_voltage")?,
                operating_frequency: row.try_get("operating_frequency")?,
                current: row.try_get("rated_current")?,
                weight: row.try_get("weight")?,
                length_mm: row.try_get("length_mm")?,
                width_mm: row.try_get("width_mm")?,
                height_mm: row.try_get("height_mm")?,
                power_ports: row.try_get("power_ports")?,
                signal_lines: row.try_get("signal_lines")?,
                software_name: row.try_get("software_name")?,
                software_version: row.try_get("software_version")?,
                industry: json_list(&row, "industry")?,
                industry_other: row.try_get("industry_other")?,
                preferred_date: row.try_get("preferred_date")?,
                notes: row.try_get("notes")?,
            })
        })
        .transpose()
    }

    pub async fn upsert_details(
        &self,
        id: i64,
        payload: &CertificationDetailsPayload,
    ) -> IntakeResult<()> {
        sqlx::query(
            r#"
            INSERT INTO certification_details (
                request_id, target_region, product_name, product_category,
                standards, estimated_fee_range, additional_notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(request_id) DO UPDATE SET
                target_region = excluded.target_region,
                product_name = excluded.product_name,
                product_category = excluded.product_category,
                standards = excluded.standards,
                estimated_fee_range = excluded.estimated_fee_range,
                additional_notes = excluded.additional_notes
            "#,
        )
        .bind(id)
        .bind(&payload.target_region)
        .bind(&payload.product_name)
        .bind(&payload.product_category)
        .bind(Json(&payload.standards))
        .bind(&payload.estimated_fee_range)
        .bind(&payload.additional_notes)
        .execute(&self.pool)
        .await?;

        debug!(request_id = id, "Certification details upserted");
        Ok(())
    }

    pub async fn find_details(&self, id: i64) -> IntakeResult<Option<CertificationDetails>> {
        let row = sqlx::query("SELECT * FROM certification_details WHERE request_id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> IntakeResult<CertificationDetails> {
            Ok(CertificationDetails {
                id: row.try_get("id")?,
                target_region: row.try_get("target_region")?,
                product_name: row.try_get("product_name")?,
                product_category: row.try_get("product_category")?,
                standards: json_list(&row, "standards")?,
                estimated_fee_range: row.try_get("estimated_fee_range")?,
                additional_notes: row.try_get("additional_notes")?,
            })
        })
        .transpose()
    }

    pub async fn upsert_requirements(
        &self,
        id: i64,
        payload: &RequirementsPayload,
    ) -> IntakeResult<()> {
        sqlx::query(
            r#"
            INSERT INTO requirements (request_id, test_type, selected_tests)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(request_id) DO UPDATE SET
                test_type = excluded.test_type,
                selected_tests = excluded.selected_tests
            "#,
        )
        .bind(id)
        .bind(&payload.test_type)
        .bind(Json(&payload.selected_tests))
        .execute(&self.pool)
        .await?;

        debug!(request_id = id, "Requirements upserted");
        Ok(())
    }

    pub async fn find_requirements(&self, id: i64) -> IntakeResult<Option<Requirements>> {
        let row = sqlx::query("SELECT id, test_type, selected_tests FROM requirements WHERE request_id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> IntakeResult<Requirements> {
            Ok(Requirements {
                id: row.try_get("id")?,
                test_type: row.try_get("test_type")?,
                selected_tests: json_list(&row, "selected_tests")?,
            })
        })
        .transpose()
    }

    pub async fn upsert_standards(&self, id: i64, payload: &StandardsPayload) -> IntakeResult<()> {
        sqlx::query(
            r#"
            INSERT INTO standards (request_id, regions, standards)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(request_id) DO UPDATE SET
                regions = excluded.regions,
                standards = excluded.standards
            "#,
        )
        .bind(id)
        .bind(Json(&payload.regions))
        .bind(Json(&payload.standards))
        .execute(&self.pool)
        .await?;

        debug!(request_id = id, "Standards upserted");
        Ok(())
    }

    pub async fn find_standards(&self, id: i64) -> IntakeResult<Option<Standards>> {
        let row = sqlx::query("SELECT id, regions, standards FROM standards WHERE request_id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> IntakeResult<Standards> {
            Ok(Standards {
                id: row.try_get("id")?,
                regions: json_list(&row, "regions")?,
                standards: json_list(&row, "standards")?,
            })
        })
        .transpose()
    }

    /// Upsert the lab selection without touching the request status
    pub async fn upsert_lab_selection(
        &self,
        id: i64,
        payload: &LabSelectionPayload,
    ) -> IntakeResult<LabSelection> {
        let mut tx = self.pool.begin().await?;
        write_lab_selection(&mut tx, id, payload).await?;
        touch(&mut tx, id).await?;
        let lab = read_lab_selection(&mut tx, id).await?;
        tx.commit().await?;

        lab.ok_or_else(|| IntakeError::CorruptRow(format!("lab selection for request {id} vanished")))
    }

    /// Upsert the lab selection and flip the request to submitted in one unit of work
    pub async fn submit_with_lab_selection(
        &self,
        id: i64,
        payload: &LabSelectionPayload,
    ) -> IntakeResult<()> {
        let mut tx = self.pool.begin().await?;
        write_lab_selection(&mut tx, id, payload).await?;
        sqlx::query("UPDATE intake_requests SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(RequestStatus::Submitted.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn find_lab_selection(&self, id: i64) -> IntakeResult<Option<LabSelection>> {
        let mut conn = self.pool.acquire().await?;
        read_lab_selection(&mut conn, id).await
    }

    /// Append document rows in one transaction; nothing is inserted if any row fails
    pub async fn insert_documents(
        &self,
        id: i64,
        documents: &[NewDocument],
    ) -> IntakeResult<Vec<TechnicalDocument>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(documents.len());
        let uploaded_at = Utc::now();

        for document in documents {
            let result = sqlx::query(
                r#"
                INSERT INTO technical_documents (
                    request_id, doc_type, file_name, file_path, file_size,
                    display_order, uploaded_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(id)
            .bind(&document.doc_type)
            .bind(&document.file_name)
            .bind(&document.file_path)
            .bind(document.file_size)
            .bind(document.display_order)
            .bind(uploaded_at)
            .execute(&mut *tx)
            .await?;

            inserted.push(TechnicalDocument {
                id: result.last_insert_rowid(),
                doc_type: document.doc_type.clone(),
                file_name: document.file_name.clone(),
                file_path: document.file_path.clone(),
                file_size: document.file_size,
                display_order: document.display_order,
                uploaded_at,
            });
        }

        touch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn list_documents(&self, id: i64) -> IntakeResult<Vec<TechnicalDocument>> {
        let rows = sqlx::query(
            r#"
            SELECT id, doc_type, file_name, file_path, file_size, display_order, uploaded_at
            FROM technical_documents
            WHERE request_id = ?1
            ORDER BY display_order ASC, id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> IntakeResult<TechnicalDocument> {
                Ok(TechnicalDocument {
                    id: row.try_get("id")?,
                    doc_type: row.try_get("doc_type")?,
                    file_name: row.try_get("file_name")?,
                    file_path: row.try_get("file_path")?,
                    file_size: row.try_get("file_size")?,
                    display_order: row.try_get("display_order")?,
                    uploaded_at: row.try_get::<DateTime<Utc>, _>("uploaded_at")?,
                })
            })
            .collect()
    }
}

async fn touch(conn: &mut SqliteConnection, id: i64) -> IntakeResult<()> {
    sqlx::query("UPDATE intake_requests SET updated_at = ?1 WHERE id = ?2")
        .bind(Utc::now())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Insert or update the lab selection. The stored region is replaced only by a
/// non-blank incoming region; labs and remarks are always overwritten.
async fn write_lab_selection(
    conn: &mut SqliteConnection,
    id: i64,
    payload: &LabSelectionPayload,
) -> IntakeResult<()> {
    sqlx::query(
        r#"
        INSERT INTO lab_selections (request_id, selected_labs, region, remarks)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(request_id) DO UPDATE SET
            selected_labs = excluded.selected_labs,
            region = COALESCE(excluded.region, lab_selections.region),
            remarks = excluded.remarks
        "#,
    )
    .bind(id)
    .bind(Json(&payload.selected_labs))
    .bind(payload.effective_region().map(Json))
    .bind(&payload.remarks)
    .execute(conn)
    .await?;
    Ok(())
}

async fn read_lab_selection(
    conn: &mut SqliteConnection,
    id: i64,
) -> IntakeResult<Option<LabSelection>> {
    let row = sqlx::query(
        "SELECT id, selected_labs, region, remarks FROM lab_selections WHERE request_id = ?1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    row.map(|row| -> IntakeResult<LabSelection> {
        let region: Option<Json<Region>> = row.try_get("region")?;
        Ok(LabSelection {
            id: row.try_get("id")?,
            selected_labs: json_list(&row, "selected_labs")?,
            region: region.map(|Json(region)| region),
            remarks: row.try_get("remarks")?,
        })
    })
    .transpose()
}

fn request_from_row(row: &SqliteRow) -> IntakeResult<RequestRecord> {
    let workflow: String = row.try_get("workflow")?;
    let status: String = row.try_get("status")?;

    Ok(RequestRecord {
        id: row.try_get("id")?,
        workflow: workflow.parse().map_err(IntakeError::CorruptRow)?,
        status: status.parse().map_err(IntakeError::CorruptRow)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Decode a JSON list column, reading NULL as an empty list
fn json_list(row: &SqliteRow, column: &str) -> IntakeResult<Vec<String>> {
    let value: Option<Json<Vec<String>>> = row.try_get(column)?;
    Ok(value.map(|Json(list)| list).unwrap_or_default())
}
