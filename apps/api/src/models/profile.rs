use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub years: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub period: String,
    pub description: String,
}

/// Static CV data rendered in the profile view. Built once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub title: String,
    pub headline: String,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
}

impl ProfileRecord {
    pub fn default_profile() -> Self {
        Self {
            name: "Diego Aparicio Sánchez".to_string(),
            title: "Ingeniero de Ciberseguridad | Pentesting | Cloud Security".to_string(),
            headline: "Cybersecurity Expert".to_string(),
            education: vec![
                education(
                    "Grado en Ingeniería de Ciberseguridad",
                    "Universidad Rey Juan Carlos",
                    "2022-2026",
                ),
                education(
                    "Máster en Ciberseguridad",
                    "IMMUNE Technology Institute",
                    "2021-2022",
                ),
                education(
                    "Administración de Sistemas Informáticos en Red",
                    "IES Clara del Rey",
                    "2018-2020",
                ),
            ],
            experience: vec![
                experience(
                    "Cyber Intelligence Analyst",
                    "Advens Iberia",
                    "2025 - Actualidad",
                    "Automatización con Python y AWS, gestión de vulnerabilidades.",
                ),
                experience(
                    "DevOps Engineer",
                    "MMG-DEZZAI",
                    "2020",
                    "CI/CD, Docker y automatización de tareas de despliegue.",
                ),
            ],
            skills: [
                "Python",
                "AWS (IaC)",
                "Pentesting Web",
                "OSINT",
                "Ansible",
                "Docker",
                "Threat Intel",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

fn education(degree: &str, institution: &str, years: &str) -> EducationEntry {
    EducationEntry {
        degree: degree.to_string(),
        institution: institution.to_string(),
        years: years.to_string(),
    }
}

fn experience(role: &str, company: &str, period: &str, description: &str) -> ExperienceEntry {
    ExperienceEntry {
        role: role.to_string(),
        company: company.to_string(),
        period: period.to_string(),
        description: description.to_string(),
    }
}
