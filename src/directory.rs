//! Hospitals, groups and professionals.
//!
//! The planner only sees opaque identifiers. The directory is what the
//! front end consults before building a request, so a shift is never
//! planned for a professional outside the chosen group.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: String,
    pub name: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub hospital_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    pub id: String,
    pub name: String,
    pub crm: Option<String>,
    pub group_ids: Vec<String>,
    pub active: bool,
}

/// Group id derived from the hospital id and the group name, e.g.
/// `hospital-valenca` + `Centro Cirúrgico` -> `hospital-valenca-centro-cirúrgico`.
pub fn group_slug(hospital_id: &str, name: &str) -> String {
    let name = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("{}-{}", hospital_id, name)
}

#[derive(Debug, Clone, Default)]
pub struct Directory {
    hospitals: HashMap<String, Hospital>,
    groups: HashMap<String, Group>,
    professionals: HashMap<String, Professional>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory with the three Piauí hospitals and their groups, plus a
    /// couple of professionals for demos.
    pub fn seeded() -> Self {
        let mut directory = Directory::new();

        let hospitals = [
            (
                "hospital-srn",
                "Hospital Regional Senador José Cândido Ferraz",
                "São Raimundo Nonato",
                &[
                    ("Plantonista Ortopedia", "Plantão de ortopedia"),
                    ("Sobreaviso Ortopedia", "Sobreaviso de ortopedia"),
                    ("Coordenação Ortopedia", "Coordenação de ortopedia"),
                    ("Plantonista Cirurgia Geral", "Plantão de cirurgia geral"),
                    ("Sobreaviso Cirurgia Geral", "Sobreaviso de cirurgia geral"),
                    ("Coordenação Cirurgia Geral", "Coordenação de cirurgia geral"),
                ][..],
            ),
            (
                "hospital-valenca",
                "Hospital Regional Eustáquio Portela",
                "Valença",
                &[
                    ("Ortopedista Plantonista", "Plantão de ortopedia"),
                    ("Centro Cirúrgico", "Equipe do centro cirúrgico"),
                    ("Coordenação", "Coordenação geral"),
                ][..],
            ),
            (
                "hospital-mocambinho",
                "Unidade Integrada do Mocambinho",
                "Teresina",
                &[
                    ("Plantão Geral", "Plantão geral"),
                    ("Centro Cirúrgico", "Equipe do centro cirúrgico"),
                    ("Coordenação", "Coordenação geral"),
                ][..],
            ),
        ];

        for (id, name, city, groups) in hospitals {
            directory.add_hospital(Hospital {
                id: id.to_string(),
                name: name.to_string(),
                city: city.to_string(),
                state: "PI".to_string(),
            });
            for (group_name, description) in groups {
                directory.groups.insert(
                    group_slug(id, group_name),
                    Group {
                        id: group_slug(id, group_name),
                        name: group_name.to_string(),
                        description: Some(description.to_string()),
                        hospital_id: id.to_string(),
                    },
                );
            }
        }

        directory.add_professional(Professional {
            id: "user-john-doe".to_string(),
            name: "John Doe".to_string(),
            crm: Some("12345-PI".to_string()),
            group_ids: vec![
                group_slug("hospital-srn", "Plantonista Ortopedia"),
                group_slug("hospital-valenca", "Ortopedista Plantonista"),
            ],
            active: true,
        });
        directory.add_professional(Professional {
            id: "user-maria-silva".to_string(),
            name: "Maria Silva".to_string(),
            crm: Some("67890-PI".to_string()),
            group_ids: vec![group_slug("hospital-mocambinho", "Plantão Geral")],
            active: true,
        });

        directory
    }

    pub fn add_hospital(&mut self, hospital: Hospital) {
        self.hospitals.insert(hospital.id.clone(), hospital);
    }

    /// Add a group; its hospital must already be known.
    pub fn add_group(&mut self, group: Group) -> Result<(), ValidationError> {
        if !self.hospitals.contains_key(&group.hospital_id) {
            return Err(ValidationError::UnknownHospital(group.hospital_id));
        }
        self.groups.insert(group.id.clone(), group);
        Ok(())
    }

    pub fn add_professional(&mut self, professional: Professional) {
        self.professionals
            .insert(professional.id.clone(), professional);
    }

    pub fn hospital(&self, id: &str) -> Option<&Hospital> {
        self.hospitals.get(id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn professional(&self, id: &str) -> Option<&Professional> {
        self.professionals.get(id)
    }

    /// Hospitals sorted by name.
    pub fn hospitals(&self) -> Vec<&Hospital> {
        let mut hospitals: Vec<&Hospital> = self.hospitals.values().collect();
        hospitals.sort_by(|a, b| a.name.cmp(&b.name));
        hospitals
    }

    /// Groups of a hospital sorted by name.
    pub fn groups_of(&self, hospital_id: &str) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self
            .groups
            .values()
            .filter(|g| g.hospital_id == hospital_id)
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups
    }

    /// Active members of a group sorted by name.
    pub fn members_of(&self, group_id: &str) -> Vec<&Professional> {
        let mut members: Vec<&Professional> = self
            .professionals
            .values()
            .filter(|p| p.active && p.group_ids.iter().any(|g| g == group_id))
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        members
    }

    /// Check that the professional can work for this group of this hospital.
    pub fn check_assignment(
        &self,
        hospital_id: &str,
        group_id: &str,
        user_id: &str,
    ) -> Result<(), ValidationError> {
        if !self.hospitals.contains_key(hospital_id) {
            return Err(ValidationError::UnknownHospital(hospital_id.to_string()));
        }
        let group = self
            .groups
            .get(group_id)
            .ok_or_else(|| ValidationError::UnknownGroup(group_id.to_string()))?;
        if group.hospital_id != hospital_id {
            return Err(ValidationError::GroupNotInHospital {
                group_id: group_id.to_string(),
                hospital_id: hospital_id.to_string(),
            });
        }
        let professional = self
            .professionals
            .get(user_id)
            .ok_or_else(|| ValidationError::UnknownProfessional(user_id.to_string()))?;
        if !professional.active {
            return Err(ValidationError::InactiveProfessional(user_id.to_string()));
        }
        if !professional.group_ids.iter().any(|g| g == group_id) {
            return Err(ValidationError::NotAGroupMember {
                user_id: user_id.to_string(),
                group_id: group_id.to_string(),
            });
        }
        Ok(())
    }
}
