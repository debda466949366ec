use std::collections::HashMap;
use std::path::Path;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use rightsplace_shared::clients::db::DbPool;
use rightsplace_shared::clients::minio::MinioClient;
use rightsplace_shared::errors::{AppError, AppResult, ErrorCode};

use crate::forms::{CleanReport, UploadedFile};
use crate::models::{Account, Case, Evidence, NewEvidence, NewReport, Report, UserProfile};
use crate::schema::{accounts, cases, evidence, reports, user_profiles};

/// `evidence/<report id>/<random>.<ext>`. The extension comes from the
/// content type; the uploaded name only picks among its known extensions.
pub fn evidence_key(report_id: Uuid, file: &UploadedFile) -> String {
    let from_name = Path::new(&file.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let ext = file
        .essence()
        .and_then(|ct| mime_guess::get_mime_extensions_str(&ct))
        .and_then(|known| {
            known
                .iter()
                .find(|e| from_name.as_deref() == Some(**e))
                .or_else(|| known.first())
        })
        .map(|e| e.to_string());

    let object = Uuid::new_v4();
    match ext {
        Some(ext) => format!("evidence/{report_id}/{object}.{ext}"),
        None => format!("evidence/{report_id}/{object}"),
    }
}

/// Stores the files, then the report and its evidence rows in one
/// transaction. Objects already uploaded are removed if anything fails.
pub async fn submit_report(
    db: &DbPool,
    storage: &MinioClient,
    reporter_id: Option<Uuid>,
    report: CleanReport,
    files: Vec<UploadedFile>,
) -> AppResult<(Report, Vec<Evidence>)> {
    let report_id = Uuid::now_v7();
    let mut pending: Vec<NewEvidence> = Vec::with_capacity(files.len());

    for file in files {
        let storage_key = evidence_key(report_id, &file);
        let content_type = file
            .essence()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let size_bytes = file.size as i64;

        if let Err(e) = storage.upload(&storage_key, file.data, &content_type).await {
            tracing::error!(report_id = %report_id, file = %file.file_name, error = %e, "evidence upload failed");
            storage.delete_all(&keys_of(&pending)).await;
            return Err(AppError::new(
                ErrorCode::EvidenceUploadFailed,
                "Evidence could not be stored. Please try again.",
            ));
        }

        pending.push(NewEvidence {
            report_id,
            storage_key,
            file_name: file.file_name,
            content_type,
            size_bytes,
            caption: None,
        });
    }

    let new_report = NewReport {
        id: report_id,
        reporter_id,
        title: report.title,
        description: report.description,
        category: report.category.code().to_string(),
        incident_location: report.incident_location,
        incident_date: report.incident_date,
        contact_email: report.contact_email,
        contact_phone: report.contact_phone,
    };

    let saved = insert_report(db, &new_report, &pending);
    if saved.is_err() {
        storage.delete_all(&keys_of(&pending)).await;
    }
    let (report, stored) = saved?;

    metrics::counter!(
        "rightsplace_reports_submitted_total",
        "anonymous" => report.is_anonymous().to_string()
    )
    .increment(1);
    metrics::counter!("rightsplace_evidence_stored_total").increment(stored.len() as u64);

    tracing::info!(
        report_id = %report.id,
        anonymous = report.is_anonymous(),
        evidence = stored.len(),
        "report submitted"
    );

    Ok((report, stored))
}

fn keys_of(pending: &[NewEvidence]) -> Vec<String> {
    pending.iter().map(|e| e.storage_key.clone()).collect()
}

fn insert_report(
    db: &DbPool,
    new_report: &NewReport,
    pending: &[NewEvidence],
) -> AppResult<(Report, Vec<Evidence>)> {
    let mut conn = db.get()?;
    conn.transaction(|conn| {
        let report: Report = diesel::insert_into(reports::table)
            .values(new_report)
            .get_result(conn)?;

        let stored: Vec<Evidence> = if pending.is_empty() {
            Vec::new()
        } else {
            diesel::insert_into(evidence::table)
                .values(pending)
                .get_results(conn)?
        };

        Ok((report, stored))
    })
}

pub fn find_report(conn: &mut PgConnection, report_id: Uuid) -> AppResult<Report> {
    reports::table
        .find(report_id)
        .first::<Report>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound, "report not found"))
}

/// One row of a reporter's dashboard.
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub report: Report,
    pub evidence_count: i64,
    pub case: Option<Case>,
    pub lawyer_name: Option<String>,
    pub ngo_name: Option<String>,
}

/// Reports owned by a profile, newest first.
pub fn reports_for_reporter(conn: &mut PgConnection, profile_id: Uuid) -> AppResult<Vec<ReportSummary>> {
    let rows: Vec<(Report, Option<Case>)> = reports::table
        .left_join(cases::table)
        .filter(reports::reporter_id.eq(profile_id))
        .order(reports::created_at.desc())
        .select((Report::as_select(), Option::<Case>::as_select()))
        .load(conn)?;

    let ids: Vec<Uuid> = rows.iter().map(|(r, _)| r.id).collect();
    let counts = evidence_counts(conn, &ids)?;

    let partner_ids: Vec<Uuid> = rows
        .iter()
        .filter_map(|(_, case)| case.as_ref())
        .flat_map(|c| [c.assigned_lawyer_id, c.assigned_ngo_id])
        .flatten()
        .collect();
    let names = partner_names(conn, &partner_ids)?;
    let name_of = |id: Option<Uuid>| id.and_then(|id| names.get(&id).cloned());

    Ok(rows
        .into_iter()
        .map(|(report, case)| ReportSummary {
            evidence_count: counts.get(&report.id).copied().unwrap_or(0),
            lawyer_name: name_of(case.as_ref().and_then(|c| c.assigned_lawyer_id)),
            ngo_name: name_of(case.as_ref().and_then(|c| c.assigned_ngo_id)),
            report,
            case,
        })
        .collect())
}

/// Name shown for a partner: the organization when there is one, else
/// the person.
pub fn partner_display_name(profile: &UserProfile, account: &Account) -> String {
    profile
        .organization_name
        .clone()
        .unwrap_or_else(|| account.display_name())
}

pub fn partner_names(conn: &mut PgConnection, profile_ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>> {
    if profile_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(UserProfile, Account)> = user_profiles::table
        .inner_join(accounts::table)
        .filter(user_profiles::id.eq_any(profile_ids))
        .select((UserProfile::as_select(), Account::as_select()))
        .load(conn)?;

    Ok(rows
        .iter()
        .map(|(profile, account)| (profile.id, partner_display_name(profile, account)))
        .collect())
}

pub fn evidence_counts(conn: &mut PgConnection, report_ids: &[Uuid]) -> AppResult<HashMap<Uuid, i64>> {
    if report_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let counts: Vec<(Uuid, i64)> = evidence::table
        .filter(evidence::report_id.eq_any(report_ids))
        .group_by(evidence::report_id)
        .select((evidence::report_id, diesel::dsl::count_star()))
        .load(conn)?;

    Ok(counts.into_iter().collect())
}

pub fn evidence_for_report(conn: &mut PgConnection, report_id: Uuid) -> AppResult<Vec<Evidence>> {
    Ok(evidence::table
        .filter(evidence::report_id.eq(report_id))
        .order(evidence::uploaded_at.asc())
        .load::<Evidence>(conn)?)
}

/// Deletes a report with its evidence and case, then the stored objects.
pub async fn delete_report(db: &DbPool, storage: &MinioClient, report_id: Uuid) -> AppResult<Report> {
    let (report, keys) = {
        let mut conn = db.get()?;
        conn.transaction(|conn| {
            let report = find_report(conn, report_id)?;
            let keys: Vec<String> = evidence::table
                .filter(evidence::report_id.eq(report_id))
                .select(evidence::storage_key)
                .load(conn)?;
            diesel::delete(reports::table.find(report_id)).execute(conn)?;
            Ok::<_, AppError>((report, keys))
        })?
    };

    storage.delete_all(&keys).await;
    Ok(report)
}

pub async fn delete_evidence(db: &DbPool, storage: &MinioClient, evidence_id: Uuid) -> AppResult<Evidence> {
    let removed = {
        let mut conn = db.get()?;
        diesel::delete(evidence::table.find(evidence_id))
            .get_result::<Evidence>(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::EvidenceNotFound, "evidence not found"))?
    };

    storage.delete_all(std::slice::from_ref(&removed.storage_key)).await;
    Ok(removed)
}

pub fn update_caption(
    conn: &mut PgConnection,
    evidence_id: Uuid,
    caption: Option<String>,
) -> AppResult<Evidence> {
    diesel::update(evidence::table.find(evidence_id))
        .set(evidence::caption.eq(caption))
        .get_result::<Evidence>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::EvidenceNotFound, "evidence not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, ctype: Option<&str>) -> UploadedFile {
        UploadedFile::new(name, ctype, vec![1, 2, 3])
    }

    #[test]
    fn key_keeps_a_matching_uploaded_extension() {
        let report_id = Uuid::now_v7();
        let key = evidence_key(report_id, &upload("Scene Photo.JPG", Some("image/jpeg")));
        assert!(key.starts_with(&format!("evidence/{report_id}/")));
        assert!(key.ends_with(".jpg"));
        assert!(!key.contains("Scene"));
    }

    #[test]
    fn key_extension_follows_content_type() {
        let key = evidence_key(Uuid::now_v7(), &upload("statement", Some("application/pdf")));
        assert!(key.ends_with(".pdf"));

        let key = evidence_key(Uuid::now_v7(), &upload("photo.exe", Some("image/png")));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn key_without_a_known_content_type() {
        for file in [upload("blob", None), upload("notes.pdf", Some("application/x-rightsplace-unknown"))] {
            let key = evidence_key(Uuid::now_v7(), &file);
            let object = key.rsplit('/').next().unwrap();
            assert!(Uuid::parse_str(object).is_ok(), "{key}");
        }
    }

    #[test]
    fn odd_extensions_are_not_trusted() {
        let key = evidence_key(Uuid::now_v7(), &upload("x.p$p", Some("text/plain")));
        assert!(!key.contains('$'));
        assert!(!key.contains("p$p"));
    }

    #[test]
    fn keys_are_unique_per_file() {
        let report_id = Uuid::now_v7();
        let file = upload("a.png", Some("image/png"));
        assert_ne!(evidence_key(report_id, &file), evidence_key(report_id, &file));
    }
}
