use crate::api::absence::CreateAbsence;
use crate::api::advance::CreateAdvance;
use crate::api::doublage::CreateDoublage;
use crate::api::employee::CreateEmployee;
use crate::api::extra::CreateExtra;
use crate::api::ledger::{LedgerResponse, MonthTotals, PardonRequest, PayRequest};
use crate::api::punch::{IngestPunches, NewPunch};
use crate::api::retard::CreateRetard;
use crate::api::schedule::SetSchedule;
use crate::core::sync::SyncReport;
use crate::model::employee::Employee;
use crate::model::ledger::LedgerRow;
use crate::model::notification::Notification;
use crate::model::punch::Punch;
use crate::model::schedule::ScheduleRow;
use crate::model::shift::{AdvanceStatus, Shift};
use crate::model::side::{
    AbsentRecord, AdvanceRecord, DoublageRecord, ExtraRecord, RetardRecord,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pointage API",
        version = "1.0.0",
        description = r#"
## Attendance Reconciliation & Payroll Ledger

This API ingests raw biometric punches and reconciles them into a monthly
payroll ledger, one row per employee per day.

### Key behaviors
- **Logical days** run 04:00 to 04:00; a punch at 03:59 belongs to the
  previous day.
- **Recompute is continuous**: every mutation re-derives the affected day
  before the response returns, and a throttled background sync keeps the
  open day fresh.
- **Manual overrides win**: once a ledger row is edited or pardoned by an
  operator, automatic recompute never touches it again.
- **Side tables** (advances, retards, absences, extras, doublages) hold the
  facts; the ledger rows are their reconciled projection.

### Response format
JSON throughout; malformed period keys and unknown employees reject with 400
before any write happens.
"#,
    ),
    paths(
        crate::api::ledger::get_ledger,
        crate::api::ledger::edit_ledger_row,
        crate::api::ledger::pardon,
        crate::api::ledger::pay,
        crate::api::ledger::provision,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::schedule::get_schedule,
        crate::api::schedule::set_schedule,

        crate::api::punch::ingest_punches,
        crate::api::punch::list_punches,

        crate::api::advance::add_advance,
        crate::api::advance::update_advance,
        crate::api::advance::delete_advance,
        crate::api::advance::list_advances,

        crate::api::retard::add_retard,
        crate::api::retard::update_retard,
        crate::api::retard::delete_retard,
        crate::api::retard::list_retards,

        crate::api::absence::add_absence,
        crate::api::absence::update_absence,
        crate::api::absence::delete_absence,
        crate::api::absence::list_absences,

        crate::api::extra::add_extra,
        crate::api::extra::update_extra,
        crate::api::extra::delete_extra,
        crate::api::extra::list_extras,

        crate::api::doublage::add_doublage,
        crate::api::doublage::update_doublage,
        crate::api::doublage::delete_doublage,
        crate::api::doublage::list_doublages,

        crate::api::notification::list_notifications,
        crate::api::sync::trigger_sync
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            ScheduleRow,
            SetSchedule,
            Shift,
            AdvanceStatus,
            Punch,
            NewPunch,
            IngestPunches,
            LedgerRow,
            LedgerResponse,
            MonthTotals,
            PardonRequest,
            PayRequest,
            AdvanceRecord,
            CreateAdvance,
            RetardRecord,
            CreateRetard,
            AbsentRecord,
            CreateAbsence,
            ExtraRecord,
            CreateExtra,
            DoublageRecord,
            CreateDoublage,
            Notification,
            SyncReport
        )
    ),
    tags(
        (name = "Ledger", description = "Monthly payroll ledger APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Schedule", description = "Weekly schedule APIs"),
        (name = "Punch", description = "Biometric punch feed APIs"),
        (name = "Advance", description = "Salary advance APIs"),
        (name = "Retard", description = "Lateness fact APIs"),
        (name = "Absence", description = "Absence fact APIs"),
        (name = "Extra", description = "Extra payment and penalty APIs"),
        (name = "Doublage", description = "Double-shift bonus APIs"),
        (name = "Notification", description = "Notification feed APIs"),
        (name = "Sync", description = "Recompute trigger APIs"),
    )
)]
pub struct ApiDoc;
