//! Static project catalog.
//!
//! Categories are a closed set; each maps to an ordered list of projects,
//! each project to an ordered list of images. The data is compiled in and
//! never mutated. Image paths are relative to the site's image root and may
//! contain spaces (they are URL-encoded when rendered).

use crate::locale::{Bilingual, Locale};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Commercial,
    Residential,
    Infrastructure,
    Industrial,
    Educational,
    Hospitality,
    Medical,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Commercial,
        Category::Residential,
        Category::Infrastructure,
        Category::Industrial,
        Category::Educational,
        Category::Hospitality,
        Category::Medical,
    ];

    /// Key used in `data-filter` / `data-target` attributes and URLs.
    pub fn key(self) -> &'static str {
        match self {
            Category::Commercial => "commercial",
            Category::Residential => "residential",
            Category::Infrastructure => "infrastructure",
            Category::Industrial => "industrial",
            Category::Educational => "educational",
            Category::Hospitality => "hospitality",
            Category::Medical => "medical",
        }
    }

    pub fn label(self) -> Bilingual {
        match self {
            Category::Commercial => Bilingual::new("تجاري", "Commercial"),
            Category::Residential => Bilingual::new("سكني", "Residential"),
            Category::Infrastructure => Bilingual::new("بنية تحتية", "Infrastructure"),
            Category::Industrial => Bilingual::new("صناعي", "Industrial"),
            Category::Educational => Bilingual::new("تعليمي", "Educational"),
            Category::Hospitality => Bilingual::new("ضيافة", "Hospitality"),
            Category::Medical => Bilingual::new("طبي", "Medical"),
        }
    }

    pub fn projects(self) -> &'static [Project] {
        match self {
            Category::Commercial => COMMERCIAL,
            Category::Residential => RESIDENTIAL,
            Category::Infrastructure => &[],
            Category::Industrial => INDUSTRIAL,
            Category::Educational => EDUCATIONAL,
            Category::Hospitality => HOSPITALITY,
            Category::Medical => MEDICAL,
        }
    }

    pub fn project(self, index: usize) -> Option<&'static Project> {
        self.projects().get(index)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Label of the breadcrumb root / "all categories" view.
pub const ROOT_LABEL: Bilingual = Bilingual::new("التصنيفات", "Categories");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project {
    pub name: Bilingual,
    pub images: &'static [Image],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Image {
    pub src: &'static str,
    pub caption: Option<Bilingual>,
}

impl Image {
    /// Caption in `locale`, falling back to the owning project's name.
    pub fn caption_for(&self, project: &Project, locale: Locale) -> &'static str {
        self.caption.unwrap_or(project.name).pick(locale)
    }
}

/// Project with a single image captioned with the project name.
macro_rules! project {
    ($name:literal, $src:literal) => {
        Project {
            name: Bilingual {
                ar: $name,
                en: $name,
            },
            images: &[Image {
                src: $src,
                caption: Some(Bilingual {
                    ar: $name,
                    en: $name,
                }),
            }],
        }
    };
}

static COMMERCIAL: &[Project] = &[
    project!("Boulevard Mall", "commercial/polivard.jpg"),
    project!("Rabigh King Abdullah Resort", "commercial/rabigh king abdullag.jpg"),
    project!("Roshana Mall", "commercial/roshanamall.jpg"),
    project!("10 Boutique Mall", "commercial/10botiquemall.jpg"),
    project!("Anaghayr Mall", "commercial/anaghayrmall.jpg"),
    project!("Dallah Group Offices", "commercial/dallah group.jpg"),
    project!("Randa Office Building", "commercial/randaofficebuilding.jpg"),
];

static RESIDENTIAL: &[Project] = &[
    project!("Daraytam", "residential/daraytam.jpg"),
    project!("Private Villa 1", "residential/privatevilla1.jpg"),
    project!("Private Villa 2", "residential/privatevilla2.jpg"),
    project!("Private Villa 3", "residential/privatevilla3.jpg"),
    project!("Private Villa 4", "residential/privatevilla4.jpg"),
    project!("Private Villa 5", "residential/privatevilla5.jpg"),
    project!("Private Villa 6", "residential/privatevilla6.jpg"),
];

static INDUSTRIAL: &[Project] = &[
    project!("Aujan Industry", "industrial/Aujan industry.jpg"),
    project!("SIPCO Warehouse", "industrial/SIPCOWAREHOUSE.JPG"),
    project!("Ford Showroom & Workshop", "industrial/ford_showroom_workshop.jpg"),
    project!("Mercedes Facility", "industrial/mercedes.jpg"),
    project!("Omatra Iveco Showroom", "industrial/omatraiveco_showroom.jpg"),
    project!("Red Sea Gateway Warehouse", "industrial/redeseagatewaywarehouse.jpg"),
];

static EDUCATIONAL: &[Project] = &[
    project!("CNCF Building", "educational/cncf.jpg"),
    project!("Female Reception Building", "educational/female_reciption_building.jpg"),
    project!("Gabegh GEMS High School", "educational/gabegh_gems_highschool.jpg"),
    project!("King Abdulaziz Business Building", "educational/king_abdelaziz_buisness_building.jpg"),
    project!("King Abdulaziz Engineering Building", "educational/king_abdelaziz_engineering_building.jpg"),
    project!("Material Lab Phase 2", "educational/material_lap_phase2.jpg"),
    project!("VIP Manasik Kobar Visitors", "educational/vip_manasetkobar_elzowar.jpg"),
];

static HOSPITALITY: &[Project] = &[
    project!("Hyatt Hotel", "hospitality/hayathotel.jpg"),
];

static MEDICAL: &[Project] = &[
    project!("Abdelkarim Bakr Medical", "medical/abdelkarim_bakr.jpg"),
    project!("Asser Home Medical Center", "medical/asserhomemedicalcenter.jpg"),
    project!("Juffali Medical Center", "medical/juffali_medical_center.jpg"),
    project!("Makkah Dialysis Center - Kella", "medical/mekkah_diyalsis_center_kella.jpg"),
    project!("National Guard Medical", "medical/national_guard_medical.jpg"),
];
