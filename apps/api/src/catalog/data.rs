//! Seed reference data: ISO/IEC 15288 process areas, the SE competency set,
//! the 14 role archetypes and their default involvement profiles.
//!
//! Matrix rows follow catalog order (ascending id). Process-competency
//! entries are `ProcessWeight` codes; role-process entries are `Involvement`
//! codes.

use super::{Competency, CompetencyLevel, ProcessArea, RoleArchetype};

use super::CompetencyArea::{Core, Management, SocialPersonal, Technical};
use super::LifecycleGroup::{
    Agreement, OrganizationalProjectEnabling, TechnicalManagement, TechnicalProcess,
};

pub const POLICY_MANAGER_ROLE_ID: i32 = 11;

pub const PROCESS_AREAS: [ProcessArea; 30] = [
    ProcessArea::new(1, "Acquisition", Agreement),
    ProcessArea::new(2, "Supply", Agreement),
    ProcessArea::new(3, "Life Cycle Model Management", OrganizationalProjectEnabling),
    ProcessArea::new(4, "Infrastructure Management", OrganizationalProjectEnabling),
    ProcessArea::new(5, "Portfolio Management", OrganizationalProjectEnabling),
    ProcessArea::new(6, "Human Resource Management", OrganizationalProjectEnabling),
    ProcessArea::new(7, "Quality Management", OrganizationalProjectEnabling),
    ProcessArea::new(8, "Knowledge Management", OrganizationalProjectEnabling),
    ProcessArea::new(9, "Project Planning", TechnicalManagement),
    ProcessArea::new(10, "Project Assessment and Control", TechnicalManagement),
    ProcessArea::new(11, "Decision Management", TechnicalManagement),
    ProcessArea::new(12, "Risk Management", TechnicalManagement),
    ProcessArea::new(13, "Configuration Management", TechnicalManagement),
    ProcessArea::new(14, "Information Management", TechnicalManagement),
    ProcessArea::new(15, "Measurement", TechnicalManagement),
    ProcessArea::new(16, "Quality Assurance", TechnicalManagement),
    ProcessArea::new(17, "Business or Mission Analysis", TechnicalProcess),
    ProcessArea::new(18, "Stakeholder Needs and Requirements Definition", TechnicalProcess),
    ProcessArea::new(19, "System Requirements Definition", TechnicalProcess),
    ProcessArea::new(20, "Architecture Definition", TechnicalProcess),
    ProcessArea::new(21, "Design Definition", TechnicalProcess),
    ProcessArea::new(22, "System Analysis", TechnicalProcess),
    ProcessArea::new(23, "Implementation", TechnicalProcess),
    ProcessArea::new(24, "Integration", TechnicalProcess),
    ProcessArea::new(25, "Verification", TechnicalProcess),
    ProcessArea::new(26, "Transition", TechnicalProcess),
    ProcessArea::new(27, "Validation", TechnicalProcess),
    ProcessArea::new(28, "Operation", TechnicalProcess),
    ProcessArea::new(29, "Maintenance", TechnicalProcess),
    ProcessArea::new(30, "Disposal", TechnicalProcess),
];

pub const COMPETENCIES: [Competency; 16] = [
    Competency::new(1, "Systems Thinking", Core),
    Competency::new(2, "Lifecycle Consideration", Core),
    Competency::new(3, "Customer / Value Orientation", Core),
    Competency::new(4, "Systems Modelling and Analysis", Core),
    Competency::new(5, "Communication", SocialPersonal),
    Competency::new(6, "Leadership", SocialPersonal),
    Competency::new(7, "Self-Organization", SocialPersonal),
    Competency::new(8, "Project Management", Management),
    Competency::new(9, "Decision Management", Management),
    Competency::new(10, "Information Management", Management),
    Competency::new(11, "Configuration Management", Management),
    Competency::new(12, "Requirements Definition", Technical),
    Competency::new(13, "System Architecting", Technical),
    Competency::new(14, "Integration, Verification and Validation", Technical),
    Competency::new(15, "Operation and Support", Technical),
    Competency::new(16, "Agile Methods", Technical),
];

pub const ROLE_ARCHETYPES: [RoleArchetype; 14] = [
    RoleArchetype::new(1, "Customer", "Party that orders or uses the system and states the need."),
    RoleArchetype::new(
        2,
        "Customer Representative",
        "Interface between customer and development; translates needs into requirements.",
    ),
    RoleArchetype::new(3, "Project Manager", "Plans, steers and controls the development project."),
    RoleArchetype::new(
        4,
        "System Engineer",
        "Owns requirements, architecture and the technical coherence of the system.",
    ),
    RoleArchetype::new(
        5,
        "Specialist Developer",
        "Designs and implements subsystems or components in a specialist discipline.",
    ),
    RoleArchetype::new(
        6,
        "Production Planner/Coordinator",
        "Prepares and coordinates production and the hand-over into manufacturing.",
    ),
    RoleArchetype::new(7, "Production Employee", "Builds, assembles and ships the product."),
    RoleArchetype::new(
        8,
        "Quality Engineer/Manager",
        "Defines and assures the quality standards of products and processes.",
    ),
    RoleArchetype::new(9, "V&V Operator", "Performs verification and validation activities."),
    RoleArchetype::new(
        10,
        "Service Technician",
        "Installs, operates and maintains the system in the field.",
    ),
    RoleArchetype::new(
        POLICY_MANAGER_ROLE_ID,
        "Process and Policy Manager",
        "Designs the organization's processes, policies and guidelines.",
    ),
    RoleArchetype::new(
        12,
        "Internal Support",
        "Provides infrastructure, IT, information and knowledge services to projects.",
    ),
    RoleArchetype::new(
        13,
        "Innovation Management",
        "Scouts technologies and steers the product and innovation portfolio.",
    ),
    RoleArchetype::new(14, "Management", "Sets strategy, allocates resources and makes business decisions."),
];

/// Indicator text for an exact (competency, level) pair. `Unaware` has no
/// indicator row; lookups fall back to a placeholder.
pub fn indicator_text(competency: &Competency, level: CompetencyLevel) -> Option<String> {
    let name = competency.name;
    let text = match level {
        CompetencyLevel::Unaware => return None,
        CompetencyLevel::Aware => {
            format!("Knows the basic terms and goals of {name} and can name where they matter.")
        }
        CompetencyLevel::Understand => format!(
            "Understands why {name} matters in their own work and can explain its methods."
        ),
        CompetencyLevel::Apply => format!(
            "Applies {name} independently in projects and adapts the methods to the situation."
        ),
        CompetencyLevel::Master => format!(
            "Masters {name}, shapes how the organization practices it and coaches others."
        ),
    };
    Some(text)
}

pub const PROCESS_COMPETENCY_WEIGHTS: [[u8; 16]; 30] = [
    [1, 1, 2, 0, 2, 1, 1, 1, 1, 1, 1, 0, 1, 0, 0, 0], // Acquisition
    [1, 1, 2, 0, 2, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0], // Supply
    [2, 2, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 1], // Life Cycle Model Management
    [1, 1, 0, 0, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 0], // Infrastructure Management
    [2, 1, 2, 0, 2, 1, 2, 2, 1, 0, 0, 0, 0, 0, 0, 0], // Portfolio Management
    [1, 0, 0, 0, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0], // Human Resource Management
    [1, 2, 1, 0, 1, 1, 1, 1, 1, 1, 1, 0, 0, 1, 0, 0], // Quality Management
    [1, 1, 0, 0, 2, 1, 1, 0, 0, 2, 1, 0, 0, 0, 0, 0], // Knowledge Management
    [1, 2, 1, 0, 2, 1, 2, 2, 1, 1, 0, 1, 0, 0, 0, 1], // Project Planning
    [1, 1, 1, 0, 2, 2, 1, 2, 2, 1, 0, 0, 0, 0, 0, 1], // Project Assessment and Control
    [2, 1, 1, 1, 1, 1, 1, 1, 2, 1, 0, 0, 0, 0, 0, 0], // Decision Management
    [2, 2, 1, 1, 1, 1, 1, 1, 2, 1, 0, 0, 0, 0, 0, 0], // Risk Management
    [1, 1, 0, 0, 1, 0, 1, 1, 0, 1, 2, 0, 0, 1, 0, 0], // Configuration Management
    [1, 1, 0, 0, 1, 0, 1, 1, 0, 2, 1, 0, 0, 0, 0, 0], // Information Management
    [1, 1, 0, 1, 1, 0, 1, 1, 1, 2, 0, 0, 0, 0, 0, 0], // Measurement
    [1, 1, 1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 0, 1, 0, 0], // Quality Assurance
    [2, 2, 2, 1, 2, 1, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0], // Business or Mission Analysis
    [2, 1, 2, 1, 2, 0, 1, 0, 1, 1, 0, 2, 0, 0, 0, 0], // Stakeholder Needs and Requirements Definition
    [2, 1, 1, 2, 1, 0, 1, 0, 1, 1, 1, 2, 1, 1, 0, 0], // System Requirements Definition
    [2, 2, 1, 2, 1, 1, 1, 0, 2, 1, 1, 1, 2, 1, 0, 0], // Architecture Definition
    [1, 1, 0, 2, 1, 0, 1, 0, 1, 1, 1, 1, 2, 1, 0, 1], // Design Definition
    [2, 1, 0, 2, 1, 0, 1, 0, 2, 1, 0, 1, 1, 0, 0, 0], // System Analysis
    [1, 1, 0, 1, 1, 0, 2, 0, 0, 1, 1, 1, 1, 1, 0, 1], // Implementation
    [2, 1, 0, 1, 1, 0, 1, 0, 1, 1, 1, 0, 1, 2, 0, 1], // Integration
    [1, 1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 1, 0, 2, 0, 0], // Verification
    [1, 2, 1, 0, 2, 0, 1, 1, 0, 1, 1, 0, 0, 1, 1, 0], // Transition
    [1, 1, 2, 1, 1, 0, 1, 0, 1, 1, 0, 1, 0, 2, 0, 0], // Validation
    [1, 2, 2, 0, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0, 2, 0], // Operation
    [1, 2, 1, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 2, 0], // Maintenance
    [1, 2, 0, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 0, 1, 0], // Disposal
];

pub const DEFAULT_ROLE_PROCESS_MATRIX: [[u8; 30]; 14] = [
    // Customer
    [
        2, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 0, 0,
    ],
    // Customer Representative
    [
        1, 1, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        2, 2, 1, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0,
    ],
    // Project Manager
    [
        0, 1, 0, 0, 1, 1, 0, 0,
        2, 2, 1, 2, 0, 1, 1, 0,
        0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
    // System Engineer
    [
        0, 0, 0, 0, 0, 0, 0, 0,
        1, 0, 1, 1, 1, 0, 0, 0,
        1, 2, 2, 4, 1, 2, 0, 1, 1, 0, 1, 0, 0, 0,
    ],
    // Specialist Developer
    [
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 1, 0, 0, 0,
        0, 0, 0, 1, 2, 1, 2, 2, 1, 0, 0, 0, 1, 0,
    ],
    // Production Planner/Coordinator
    [
        0, 0, 0, 1, 0, 0, 0, 0,
        2, 1, 0, 0, 0, 1, 1, 0,
        0, 0, 0, 0, 0, 0, 1, 1, 0, 2, 0, 0, 0, 0,
    ],
    // Production Employee
    [
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 2, 1, 1, 1, 0, 0, 1, 0,
    ],
    // Quality Engineer/Manager
    [
        0, 0, 1, 0, 0, 0, 4, 0,
        0, 0, 0, 0, 1, 0, 2, 2,
        0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0,
    ],
    // V&V Operator
    [
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 1, 1,
        0, 0, 0, 0, 0, 0, 0, 1, 2, 0, 2, 0, 0, 0,
    ],
    // Service Technician
    [
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 1, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 2, 2, 1,
    ],
    // Process and Policy Manager
    [
        3, 3, 3, 3, 3, 3, 3, 3,
        3, 3, 3, 3, 3, 3, 3, 3,
        3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3,
    ],
    // Internal Support
    [
        0, 0, 0, 2, 0, 1, 0, 1,
        0, 0, 0, 0, 1, 2, 1, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
    // Innovation Management
    [
        0, 0, 0, 0, 2, 0, 0, 1,
        0, 0, 1, 1, 0, 0, 0, 0,
        2, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
    // Management
    [
        1, 1, 1, 1, 2, 2, 1, 1,
        0, 1, 2, 1, 0, 0, 0, 0,
        1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
];
