//! Command parsing and plain-text rendering for the `shipline` binary.

use clap::{Parser, Subcommand};
use shipline_core::{
    estimate_delivery, format_tracking_number, format_work_time, summarize, AuditLog,
    DashboardAnalytics, DriverAvailability, Shipment, ShipmentId, ShipmentRatingStatus,
    ShipmentStatus,
};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Command-line client for the Shipline logistics backend.
#[derive(Parser, Debug)]
#[command(name = "shipline", version, arg_required_else_help = true)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "SHIPLINE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Look up a shipment by tracking number
    Track {
        /// Tracking number, hyphens and spaces allowed
        number: String,
    },

    /// Look up a shipment by id
    Show {
        id: ShipmentId,
    },

    /// Check a tracking number
    Validate {
        number: String,
    },

    /// Print a tracking number in display form
    Format {
        number: String,
    },

    /// List driver availability
    Drivers,

    /// Print dashboard analytics
    Analytics,

    /// List your recent activity
    Activity {
        /// Page number, starting at 1
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// List delivered shipments awaiting a driver rating
    Ratings,

    /// Look up coordinates for an address
    Geocode {
        /// Address words; joined with spaces
        #[arg(required = true, num_args = 1..)]
        address: Vec<String>,
    },
}

impl Command {
    /// Commands that need neither config nor network.
    pub fn is_offline(&self) -> bool {
        matches!(self, Command::Validate { .. } | Command::Format { .. })
    }
}

// ============================================================================
// RENDERING
// ============================================================================

pub fn render_shipment(shipment: &Shipment) -> String {
    let summary = summarize(shipment);
    let estimate = estimate_delivery(shipment);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}  [{}] ({})",
        format_tracking_number(&shipment.tracking_number),
        shipment.status.label(),
        shipment.status.color()
    );
    let _ = writeln!(out, "From: {}", shipment.origin_address);
    let _ = writeln!(
        out,
        "To:   {} ({})",
        shipment.destination_address, shipment.receiver_name
    );
    match &shipment.assigned_driver {
        Some(driver) => {
            let _ = writeln!(out, "Driver: {}", driver.full_name);
        }
        None => {
            let _ = writeln!(out, "Driver: not assigned");
        }
    }

    match estimate.estimated {
        Some(at) => {
            let _ = writeln!(out, "Estimated delivery: {}", at.format("%Y-%m-%d"));
        }
        None if summary.is_delivered => {
            let _ = writeln!(out, "Delivered");
        }
        None => {}
    }

    let _ = writeln!(out, "Updates: {}", summary.total_updates);
    for update in &summary.timeline {
        let _ = write!(
            out,
            "  {}  {}",
            update.timestamp.format("%Y-%m-%d %H:%M"),
            update.status.label()
        );
        if let Some(location) = &update.location {
            let _ = write!(out, " @ {}", location);
        }
        if let Some(remarks) = &update.remarks {
            let _ = write!(out, " ({})", remarks);
        }
        out.push('\n');
    }
    out
}

pub fn render_drivers(drivers: &[DriverAvailability]) -> String {
    if drivers.is_empty() {
        return "No drivers found\n".to_string();
    }
    let mut out = String::new();
    for entry in drivers {
        let details = &entry.driver_details;
        let rating = if entry.has_ratings() {
            format!("{:.1} ({} ratings)", entry.rating, entry.total_ratings)
        } else {
            "No ratings".to_string()
        };
        let _ = writeln!(
            out,
            "{:<24} {:<10} ({}) {}/{} active  {}  hours {}-{}{}",
            entry.driver.full_name,
            details.status,
            details.status.color(),
            entry.active_shipments,
            entry.capacity(),
            rating,
            format_work_time(details.work_start_time.as_deref()),
            format_work_time(details.work_end_time.as_deref()),
            if entry.is_available { "" } else { "  unavailable" }
        );
    }
    out
}

pub fn render_analytics(analytics: &DashboardAnalytics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total shipments:     {}", analytics.total_shipments);
    let _ = writeln!(out, "Active shipments:    {}", analytics.active_shipments);
    let _ = writeln!(out, "Delivered shipments: {}", analytics.delivered_shipments);
    let _ = writeln!(out, "Pending shipments:   {}", analytics.pending_shipments);
    let _ = writeln!(out, "Drivers:             {}", analytics.total_drivers);
    let _ = writeln!(out, "Customers:           {}", analytics.total_customers);
    for status in ShipmentStatus::ALL {
        let _ = writeln!(
            out,
            "  {:<11} {}",
            status.label(),
            analytics.count_for(status)
        );
    }
    for month in &analytics.monthly_stats {
        let _ = writeln!(out, "  {:<11} {}", month.month, month.count);
    }
    out
}

pub fn render_activity(logs: &[AuditLog]) -> String {
    if logs.is_empty() {
        return "No activity\n".to_string();
    }
    let mut out = String::new();
    for log in logs {
        let _ = write!(
            out,
            "{}  {} {}",
            log.timestamp.format("%Y-%m-%d %H:%M"),
            log.action,
            log.target_table
        );
        if let Some(target) = &log.target_id {
            let _ = write!(out, "#{}", target);
        }
        if let Some(details) = &log.details {
            let _ = write!(out, "  {}", details);
        }
        out.push('\n');
    }
    out
}

pub fn render_pending_ratings(pending: &[(&Shipment, ShipmentRatingStatus)]) -> String {
    if pending.is_empty() {
        return "No deliveries awaiting a rating\n".to_string();
    }
    let mut out = String::new();
    for (shipment, _) in pending {
        let driver = shipment
            .assigned_driver
            .as_ref()
            .map(|d| d.full_name.as_str())
            .unwrap_or("unknown driver");
        let _ = writeln!(
            out,
            "{}  delivered by {}",
            format_tracking_number(&shipment.tracking_number),
            driver
        );
    }
    out
}
