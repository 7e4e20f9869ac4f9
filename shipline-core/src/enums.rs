//! Enum types for Shipline entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SHIPMENT STATUS
// ============================================================================

/// Lifecycle status of a shipment.
///
/// Transitions are owned by the backend; the client only reads and labels
/// the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShipmentStatus {
    #[default]
    Created,
    PickedUp,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 5] = [
        ShipmentStatus::Created,
        ShipmentStatus::PickedUp,
        ShipmentStatus::InTransit,
        ShipmentStatus::Delivered,
        ShipmentStatus::Cancelled,
    ];

    /// Wire representation, as sent by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Created => "Created",
            ShipmentStatus::PickedUp => "PickedUp",
            ShipmentStatus::InTransit => "InTransit",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Cancelled => "Cancelled",
        }
    }

    /// Human readable label used by status badges.
    pub fn label(&self) -> &'static str {
        match self {
            ShipmentStatus::Created => "Created",
            ShipmentStatus::PickedUp => "Picked Up",
            ShipmentStatus::InTransit => "In Transit",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Cancelled => "Cancelled",
        }
    }

    pub fn color(&self) -> BadgeColor {
        match self {
            ShipmentStatus::Created => BadgeColor::Gray,
            ShipmentStatus::PickedUp => BadgeColor::Blue,
            ShipmentStatus::InTransit => BadgeColor::Yellow,
            ShipmentStatus::Delivered => BadgeColor::Green,
            ShipmentStatus::Cancelled => BadgeColor::Red,
        }
    }

    /// Delivered and cancelled shipments never move again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered | ShipmentStatus::Cancelled)
    }

    /// Days added to the creation date when estimating delivery.
    /// `None` for terminal statuses.
    pub fn estimated_transit_days(&self) -> Option<i64> {
        match self {
            ShipmentStatus::Created => Some(3),
            ShipmentStatus::PickedUp => Some(2),
            ShipmentStatus::InTransit => Some(1),
            ShipmentStatus::Delivered | ShipmentStatus::Cancelled => None,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "created" => Ok(ShipmentStatus::Created),
            "pickedup" => Ok(ShipmentStatus::PickedUp),
            "intransit" => Ok(ShipmentStatus::InTransit),
            "delivered" => Ok(ShipmentStatus::Delivered),
            "cancelled" | "canceled" => Ok(ShipmentStatus::Cancelled),
            _ => Err(format!("Invalid ShipmentStatus: {}", s)),
        }
    }
}

/// Badge color for a raw status string. Unknown values render gray.
pub fn status_color_for(status: &str) -> BadgeColor {
    status
        .parse::<ShipmentStatus>()
        .map(|s| s.color())
        .unwrap_or(BadgeColor::Gray)
}

// ============================================================================
// BADGE COLOR
// ============================================================================

/// Palette used for status badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeColor {
    Gray,
    Blue,
    Yellow,
    Green,
    Red,
}

impl BadgeColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeColor::Gray => "gray",
            BadgeColor::Blue => "blue",
            BadgeColor::Yellow => "yellow",
            BadgeColor::Green => "green",
            BadgeColor::Red => "red",
        }
    }
}

impl fmt::Display for BadgeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// USERS AND DRIVERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Driver,
    Customer,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            UserRole::Admin => "Admin",
            UserRole::Driver => "Driver",
            UserRole::Customer => "Customer",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "admin" => Ok(UserRole::Admin),
            "driver" => Ok(UserRole::Driver),
            "customer" => Ok(UserRole::Customer),
            _ => Err(format!("Invalid UserRole: {}", s)),
        }
    }
}

/// Self-reported working status of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DriverStatus {
    #[default]
    Available,
    Busy,
    OffDuty,
    OnBreak,
}

impl DriverStatus {
    pub fn color(&self) -> BadgeColor {
        match self {
            DriverStatus::Available => BadgeColor::Green,
            DriverStatus::Busy => BadgeColor::Yellow,
            DriverStatus::OffDuty => BadgeColor::Gray,
            DriverStatus::OnBreak => BadgeColor::Blue,
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DriverStatus::Available => "Available",
            DriverStatus::Busy => "Busy",
            DriverStatus::OffDuty => "OffDuty",
            DriverStatus::OnBreak => "OnBreak",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for DriverStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "available" => Ok(DriverStatus::Available),
            "busy" => Ok(DriverStatus::Busy),
            "offduty" => Ok(DriverStatus::OffDuty),
            "onbreak" => Ok(DriverStatus::OnBreak),
            _ => Err(format!("Invalid DriverStatus: {}", s)),
        }
    }
}

// ============================================================================
// REPORTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ReportType::Daily => "Daily",
            ReportType::Weekly => "Weekly",
            ReportType::Monthly => "Monthly",
            ReportType::Custom => "Custom",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "daily" => Ok(ReportType::Daily),
            "weekly" => Ok(ReportType::Weekly),
            "monthly" => Ok(ReportType::Monthly),
            "custom" => Ok(ReportType::Custom),
            _ => Err(format!("Invalid ReportType: {}", s)),
        }
    }
}

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
