use dioxus::prelude::*;

use crate::shared::types::{DashboardSnapshot, RefreshSummaryDto};

#[server(GetDashboardSnapshot)]
pub async fn dashboard_snapshot() -> Result<DashboardSnapshot, ServerFnError> {
    #[cfg(feature = "server")]
    {
        use crate::backend::coordinator::installed;

        let Some(coordinator) = installed() else {
            tracing::warn!("dashboard_snapshot: coordinator not installed");
            return Ok(DashboardSnapshot::default());
        };
        Ok(coordinator.snapshot().await)
    }
    #[cfg(not(feature = "server"))]
    {
        Ok(DashboardSnapshot::default())
    }
}

/// Runs one refresh cycle now, unless one is already in flight.
#[server(RefreshDashboard)]
pub async fn refresh_dashboard() -> Result<RefreshSummaryDto, ServerFnError> {
    #[cfg(feature = "server")]
    {
        use crate::backend::coordinator::installed;

        let Some(coordinator) = installed() else {
            return Err(ServerFnError::new("refresh coordinator is not running"));
        };
        Ok(match coordinator.refresh_unless_busy().await {
            Some(report) => RefreshSummaryDto::from(&report),
            None => RefreshSummaryDto {
                skipped: true,
                ..Default::default()
            },
        })
    }
    #[cfg(not(feature = "server"))]
    {
        Ok(RefreshSummaryDto::default())
    }
}
