// Persona instruction sent as `systemInstruction` on every analyst call.

use crate::models::profile::ProfileRecord;

pub const ANALYST_SYSTEM_TEMPLATE: &str = "\
Eres un asistente experto en carrera técnica para {name}. \
Contexto: {first_name} es Ingeniero de Ciberseguridad, experto en Python, AWS y Pentesting. \
Ha sido validado por Europol para proyectos críticos. \
Experiencia: {experience}. \
Formación: {education}. \
Stack: {skills}. \
Responde preguntas sobre su perfil, sugiere mejoras de CV o analiza su idoneidad \
para puestos de ciberseguridad.";

/// Builds the fixed system instruction for the profile. Not user-controlled.
pub fn analyst_system_instruction(profile: &ProfileRecord) -> String {
    let first_name = profile
        .name
        .split_whitespace()
        .next()
        .unwrap_or(&profile.name);

    let experience = profile
        .experience
        .iter()
        .map(|e| format!("{} en {} ({}): {}", e.role, e.company, e.period, e.description))
        .collect::<Vec<_>>()
        .join("; ");

    let education = profile
        .education
        .iter()
        .map(|e| format!("{} ({}, {})", e.degree, e.institution, e.years))
        .collect::<Vec<_>>()
        .join("; ");

    ANALYST_SYSTEM_TEMPLATE
        .replace("{name}", &profile.name)
        .replace("{first_name}", first_name)
        .replace("{experience}", &experience)
        .replace("{education}", &education)
        .replace("{skills}", &profile.skills.join(", "))
}
