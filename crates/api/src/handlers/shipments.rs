//! Handlers for the `/shipments` resource: provisioning, listing, the
//! guarded delete, and the two lifecycle operations (assign / release).
//!
//! Assignment and release are multipart endpoints because the warehouse
//! floor submits them from scanners with photo evidence attached. All
//! policy gating happens here, before the storage transaction; the
//! transaction itself lives in `StorageRepo`.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use stowage_core::charges::{compute_release_charges, ChargeBreakdown};
use stowage_core::error::CoreError;
use stowage_core::intake::{resolve_box_count, validate_required_fields, IntakeRequestView};
use stowage_core::qr::{box_token, master_token};
use stowage_core::release::{validate_release_request, ReleaseRequestView};
use stowage_core::types::DbId;
use stowage_db::models::shipment::{CreateShipment, Shipment};
use stowage_db::models::shipment_box::ShipmentBox;
use stowage_db::models::status::ShipmentStatus;
use stowage_db::models::storage::{
    AssignBoxes, AssignResult, ProvisionResult, ProvisionShipment, RackRelease, ReleaseBoxes,
    ReleaseResult,
};
use stowage_db::repositories::shipment_repo::ShipmentDelete;
use stowage_db::repositories::{
    ClientRepo, ShipmentBoxRepo, ShipmentRepo, ShipmentSettingsRepo, StorageRepo,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireManager, RequireWorker};
use crate::notify;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Shipment detail payload: the row plus its boxes in number order.
#[derive(Debug, Serialize)]
pub struct ShipmentDetail {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub status: &'static str,
    pub boxes: Vec<ShipmentBox>,
}

/// Result payload for the assignment operation.
#[derive(Debug, Serialize)]
pub struct AssignResponse {
    pub assigned_count: i32,
    pub shipment_status: &'static str,
    pub rack_capacity_used: i32,
    pub photo_urls: Vec<String>,
}

/// Result payload for the release operation.
#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub released_count: i32,
    pub remaining_count: i32,
    pub shipment_status: &'static str,
    pub racks: Vec<RackRelease>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charges: Option<ChargeBreakdown>,
    pub notified: bool,
    pub photo_urls: Vec<String>,
}

fn status_label(status_id: i16) -> &'static str {
    ShipmentStatus::from_id(status_id).map_or("unknown", ShipmentStatus::label)
}

// ---------------------------------------------------------------------------
// Provisioning
// ---------------------------------------------------------------------------

/// POST /api/v1/shipments
///
/// Register a shipment and materialize its boxes, optionally assigning them
/// to a rack at intake. Gated by the company's shipment settings.
pub async fn provision(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(input): Json<CreateShipment>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let settings =
        ShipmentSettingsRepo::find_or_create_default(&state.pool, user.company_id).await?;

    let total_boxes = resolve_box_count(
        input.original_box_count,
        input.pallet_count,
        input.boxes_per_pallet,
    )?;
    validate_required_fields(
        &settings.intake_rules(),
        &IntakeRequestView {
            client_email: input.client_email.as_deref(),
            client_phone: input.client_phone.as_deref(),
            estimated_value: input.estimated_value,
            rack_id: input.rack_id,
        },
    )?;

    let shipment_type = input
        .shipment_type
        .clone()
        .unwrap_or_else(|| settings.default_storage_type.clone());
    if shipment_type != "personal" && shipment_type != "commercial" {
        return Err(AppError::Core(CoreError::Validation(
            "shipment_type must be 'personal' or 'commercial'".into(),
        )));
    }

    // A supplied client reference must resolve within the caller's company.
    if let Some(client_id) = input.client_id {
        ClientRepo::find_by_id(&state.pool, user.company_id, client_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Client",
                id: client_id,
            }))?;
    }

    let now = chrono::Utc::now();
    let master_qr = master_token(
        settings.effective_qr_prefix(),
        now,
        input.pallet_count,
        input.boxes_per_pallet,
        total_boxes,
    );
    let box_codes: Vec<String> = (1..=total_boxes)
        .map(|n| box_token(&master_qr, n, total_boxes))
        .collect();

    let provision = ProvisionShipment {
        company_id: user.company_id,
        user_id: user.user_id,
        reference_code: input.reference_code.clone(),
        client_id: input.client_id,
        client_name: input.client_name.clone(),
        client_email: input.client_email.clone(),
        client_phone: input.client_phone.clone(),
        shipment_type,
        total_boxes,
        pallet_count: input.pallet_count,
        boxes_per_pallet: input.boxes_per_pallet,
        estimated_value: input.estimated_value,
        master_qr,
        box_codes,
        rack_id: input.rack_id,
    };

    match StorageRepo::provision_shipment(&state.pool, &provision).await? {
        ProvisionResult::Created(shipment) => {
            tracing::info!(
                shipment_id = shipment.id,
                reference = %shipment.reference_code,
                total_boxes,
                intake_rack = ?input.rack_id,
                "Shipment provisioned"
            );
            Ok((StatusCode::CREATED, Json(DataResponse { data: shipment })))
        }
        ProvisionResult::RackNotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Rack",
            id: input.rack_id.unwrap_or_default(),
        })),
    }
}

// ---------------------------------------------------------------------------
// Reads and delete
// ---------------------------------------------------------------------------

/// GET /api/v1/shipments
///
/// List the company's shipments, newest first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let shipments = ShipmentRepo::list_by_company(
        &state.pool,
        user.company_id,
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: shipments }))
}

/// GET /api/v1/shipments/{id}
///
/// Shipment detail with its boxes.
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let shipment = ShipmentRepo::find_by_id(&state.pool, user.company_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Shipment",
            id,
        }))?;
    let boxes = ShipmentBoxRepo::list_by_shipment(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ShipmentDetail {
            status: status_label(shipment.status_id),
            shipment,
            boxes,
        },
    }))
}

/// DELETE /api/v1/shipments/{id}
///
/// Delete a shipment and its boxes, unless any box is still stored.
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    match ShipmentRepo::delete(&state.pool, user.company_id, id).await? {
        ShipmentDelete::Deleted => Ok(StatusCode::NO_CONTENT),
        ShipmentDelete::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Shipment",
            id,
        })),
        ShipmentDelete::BoxesInStorage => Err(AppError::Core(CoreError::Conflict(
            "Shipment still has boxes in storage; release them first".into(),
        ))),
    }
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

#[derive(Default)]
struct AssignForm {
    rack_id: Option<DbId>,
    box_numbers: Vec<i32>,
    photos: Vec<(String, Vec<u8>)>,
}

/// POST /api/v1/shipments/{id}/assign
///
/// Multipart form: `rack_id` (required), `box_numbers` (required,
/// comma-separated), repeated `photos` file fields.
pub async fn assign(
    State(state): State<AppState>,
    RequireWorker(user): RequireWorker,
    Path(shipment_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = AssignForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "rack_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.rack_id = Some(text.trim().parse().map_err(|_| {
                    AppError::BadRequest("rack_id must be an integer".into())
                })?);
            }
            "box_numbers" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.box_numbers = parse_box_numbers(&text)?;
            }
            "photos" => {
                let filename = field.file_name().unwrap_or("photo.jpg").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.photos.push((filename, data.to_vec()));
            }
            _ => {} // ignore unknown fields
        }
    }

    let rack_id = form.rack_id.ok_or_else(|| {
        AppError::Core(CoreError::Validation("rack_id is required".into()))
    })?;
    if form.box_numbers.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "box_numbers must contain at least one box number".into(),
        )));
    }

    let photo_urls = state
        .photos
        .store_batch(&format!("assign_{shipment_id}"), form.photos)
        .await?;

    let input = AssignBoxes {
        company_id: user.company_id,
        user_id: user.user_id,
        shipment_id,
        rack_id,
        box_numbers: form.box_numbers,
        photo_count: photo_urls.len(),
    };

    match StorageRepo::assign_boxes(&state.pool, &input).await? {
        AssignResult::Assigned(outcome) => {
            tracing::info!(
                shipment_id,
                rack_id,
                assigned = outcome.assigned_count,
                "Boxes assigned to rack"
            );
            Ok(Json(DataResponse {
                data: AssignResponse {
                    assigned_count: outcome.assigned_count,
                    shipment_status: status_label(outcome.shipment_status_id),
                    rack_capacity_used: outcome.rack_capacity_used,
                    photo_urls,
                },
            }))
        }
        AssignResult::ShipmentNotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Shipment",
            id: shipment_id,
        })),
        AssignResult::RackNotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Rack",
            id: rack_id,
        })),
    }
}

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ReleaseForm {
    release_all: bool,
    box_numbers: Vec<i32>,
    collector_id: Option<String>,
    approval_reference: Option<String>,
    photos: Vec<(String, Vec<u8>)>,
}

/// POST /api/v1/shipments/{id}/release
///
/// Multipart form: `release_all` (boolean) or `box_numbers`
/// (comma-separated), optional `collector_id` and `approval_reference`
/// text fields, repeated `photos` file fields. Gated by the company's
/// release policy; charges and notification run after the commit.
pub async fn release(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(shipment_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = ReleaseForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "release_all" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.release_all = matches!(text.trim(), "true" | "1");
            }
            "box_numbers" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.box_numbers = parse_box_numbers(&text)?;
            }
            "collector_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.collector_id = Some(text).filter(|s| !s.trim().is_empty());
            }
            "approval_reference" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.approval_reference = Some(text).filter(|s| !s.trim().is_empty());
            }
            "photos" => {
                let filename = field.file_name().unwrap_or("photo.jpg").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.photos.push((filename, data.to_vec()));
            }
            _ => {}
        }
    }

    let settings =
        ShipmentSettingsRepo::find_or_create_default(&state.pool, user.company_id).await?;

    validate_release_request(
        &settings.release_rules(),
        ReleaseRequestView {
            release_all: form.release_all,
            requested_boxes: form.box_numbers.len(),
            has_collector_id: form.collector_id.is_some(),
            has_photos: !form.photos.is_empty(),
            has_approval_reference: form.approval_reference.is_some(),
        },
    )?;

    let shipment = ShipmentRepo::find_by_id(&state.pool, user.company_id, shipment_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Shipment",
            id: shipment_id,
        }))?;

    let photo_urls = state
        .photos
        .store_batch(&format!("release_{shipment_id}"), form.photos)
        .await?;

    let input = ReleaseBoxes {
        company_id: user.company_id,
        user_id: user.user_id,
        shipment_id,
        box_numbers: if form.release_all {
            None
        } else {
            Some(form.box_numbers)
        },
        photo_count: photo_urls.len(),
    };

    let outcome = match StorageRepo::release_boxes(&state.pool, &input).await? {
        ReleaseResult::Released(outcome) => outcome,
        ReleaseResult::ShipmentNotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Shipment",
                id: shipment_id,
            }));
        }
        ReleaseResult::NothingToRelease => {
            return Err(AppError::Core(CoreError::Validation(
                "None of the requested boxes are currently in storage".into(),
            )));
        }
    };

    tracing::info!(
        shipment_id,
        released = outcome.released_count,
        remaining = outcome.remaining_count,
        collector = ?form.collector_id,
        "Boxes released from storage"
    );

    // Post-commit effects: charges are a pure computation; notification is
    // fire-and-forget and never affects the committed release.
    let charges = settings.generate_release_invoice.then(|| {
        compute_release_charges(
            &settings.pricing(),
            shipment.arrived_at,
            chrono::Utc::now(),
            outcome.released_count,
        )
    });

    let mut notified = false;
    if settings.notify_client_on_release {
        if let Some(phone) = client_phone(&state, &shipment).await? {
            let message = format!(
                "Shipment {}: {} box(es) released, {} remaining in storage",
                shipment.reference_code, outcome.released_count, outcome.remaining_count
            );
            notify::dispatch(state.notifier.clone(), phone, message);
            notified = true;
        }
    }

    Ok(Json(DataResponse {
        data: ReleaseResponse {
            released_count: outcome.released_count,
            remaining_count: outcome.remaining_count,
            shipment_status: status_label(outcome.shipment_status_id),
            racks: outcome.racks,
            charges,
            notified,
            photo_urls,
        },
    }))
}

/// The phone to notify: the one on the shipment, else the linked client
/// profile's.
async fn client_phone(state: &AppState, shipment: &Shipment) -> AppResult<Option<String>> {
    if let Some(phone) = shipment.client_phone.clone().filter(|p| !p.is_empty()) {
        return Ok(Some(phone));
    }
    if let Some(client_id) = shipment.client_id {
        let client = ClientRepo::find_by_id(&state.pool, shipment.company_id, client_id).await?;
        return Ok(client.and_then(|c| c.phone).filter(|p| !p.is_empty()));
    }
    Ok(None)
}

/// Parse a comma- or whitespace-separated list of box numbers.
fn parse_box_numbers(text: &str) -> Result<Vec<i32>, AppError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>().map_err(|_| {
                AppError::BadRequest(format!("Invalid box number '{s}' in box_numbers"))
            })
        })
        .collect()
}
