use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Public flight state token as published on the flight board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateCode {
    /// Scheduled
    Sch,
    /// Delayed
    Del,
    /// Wait in lounge
    Wil,
    /// Gate open
    Gto,
    /// Boarding
    Brd,
    /// Gate closing
    Gcl,
    /// Gate closed
    Gtd,
    /// Departed
    Dep,
    /// Cancelled
    Cnx,
    /// Gate change
    Gch,
    /// Tomorrow
    Tom,
    /// Airborne (arrivals)
    Air,
    /// Expected landing
    Exp,
    /// Final approach
    Fir,
    /// Landed
    Lnd,
    /// Forward to baggage belt
    Fib,
    /// Arrived at gate
    Arr,
    /// Diverted
    Div,
    /// Unrecognised token, kept verbatim (upper-cased).
    Other(String),
    /// Sentinel for flights that carry no state at all.
    Unknown,
}

impl StateCode {
    pub fn as_str(&self) -> &str {
        match self {
            StateCode::Sch => "SCH",
            StateCode::Del => "DEL",
            StateCode::Wil => "WIL",
            StateCode::Gto => "GTO",
            StateCode::Brd => "BRD",
            StateCode::Gcl => "GCL",
            StateCode::Gtd => "GTD",
            StateCode::Dep => "DEP",
            StateCode::Cnx => "CNX",
            StateCode::Gch => "GCH",
            StateCode::Tom => "TOM",
            StateCode::Air => "AIR",
            StateCode::Exp => "EXP",
            StateCode::Fir => "FIR",
            StateCode::Lnd => "LND",
            StateCode::Fib => "FIB",
            StateCode::Arr => "ARR",
            StateCode::Div => "DIV",
            StateCode::Other(code) => code.as_str(),
            StateCode::Unknown => "UNKNOWN",
        }
    }

    /// Parse a token. Total: unknown tokens become `Other`, blanks become `Unknown`.
    pub fn parse(raw: &str) -> StateCode {
        let token = raw.trim().to_ascii_uppercase();
        match token.as_str() {
            "SCH" => StateCode::Sch,
            "DEL" => StateCode::Del,
            "WIL" => StateCode::Wil,
            "GTO" => StateCode::Gto,
            "BRD" => StateCode::Brd,
            "GCL" => StateCode::Gcl,
            "GTD" => StateCode::Gtd,
            "DEP" => StateCode::Dep,
            "CNX" => StateCode::Cnx,
            "GCH" => StateCode::Gch,
            "TOM" => StateCode::Tom,
            "AIR" => StateCode::Air,
            "EXP" => StateCode::Exp,
            "FIR" => StateCode::Fir,
            "LND" => StateCode::Lnd,
            "FIB" => StateCode::Fib,
            "ARR" => StateCode::Arr,
            "DIV" => StateCode::Div,
            "" | "UNKNOWN" => StateCode::Unknown,
            _ => StateCode::Other(token),
        }
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(StateCode::parse(s))
    }
}

impl Serialize for StateCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StateCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(StateCode::parse(&raw))
    }
}

/// States during which the aircraft physically holds the gate.
pub const OCCUPIED_STATES: &[StateCode] = &[
    StateCode::Brd,
    StateCode::Gto,
    StateCode::Gcl,
    StateCode::Gtd,
    StateCode::Wil,
];

/// States counted towards short-window gate activity.
pub const ACTIVE_STATES: &[StateCode] = &[
    StateCode::Brd,
    StateCode::Gto,
    StateCode::Gcl,
    StateCode::Gtd,
    StateCode::Dep,
];

/// States that mark a flight as not operating.
pub const CANCELLED_STATES: &[StateCode] = &[StateCode::Cnx];
