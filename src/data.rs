use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Teaching days, labelled the way the school timetable prints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Day::Monday => "thứ 2",
            Day::Tuesday => "thứ 3",
            Day::Wednesday => "thứ 4",
            Day::Thursday => "thứ 5",
            Day::Friday => "thứ 6",
            Day::Saturday => "thứ 7",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shift {
    Morning,
    Afternoon,
}

impl Shift {
    pub const ALL: [Shift; 2] = [Shift::Morning, Shift::Afternoon];

    pub fn label(self) -> &'static str {
        match self {
            Shift::Morning => "Sáng",
            Shift::Afternoon => "Chiều",
        }
    }
}

/// One of the twelve weekly teaching slots. Orders by day, then shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSlot {
    pub day: Day,
    pub shift: Shift,
}

impl TimeSlot {
    pub const COUNT: usize = Day::ALL.len() * Shift::ALL.len();

    pub fn all() -> impl Iterator<Item = TimeSlot> {
        Day::ALL
            .into_iter()
            .flat_map(|day| Shift::ALL.into_iter().map(move |shift| TimeSlot { day, shift }))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.shift.label(), self.day.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Room {
    Regular(u32),
    Lab(u32),
}

impl Room {
    pub fn is_lab(self) -> bool {
        matches!(self, Room::Lab(_))
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Regular(n) => write!(f, "Phòng {n}"),
            Room::Lab(n) => write!(f, "Lab {n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lớp {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeacherId(pub u32);

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GV{}", self.0)
    }
}

/// A value in the timetable search: where and when a lesson happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub slot: TimeSlot,
    pub room: Room,
}

/// Parameters of a schedule-generation request, as submitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub classes: u32,
    pub teachers: u32,
    pub rooms: u32,
    #[serde(default)]
    pub labs: u32,
    pub subjects: Vec<String>,
    #[serde(default)]
    pub lab_subjects: Vec<String>,
    /// Fixes the random source, for reproducible schedules.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn as_label<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// A single scheduled lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledLesson {
    #[serde(serialize_with = "as_label")]
    pub class: ClassId,
    pub subject: String,
    #[serde(serialize_with = "as_label")]
    pub teacher: TeacherId,
    #[serde(rename = "time", serialize_with = "as_label")]
    pub slot: TimeSlot,
    #[serde(serialize_with = "as_label")]
    pub room: Room,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub count: usize,
    pub lessons: Vec<ScheduledLesson>,
}

impl From<Vec<ScheduledLesson>> for ScheduleResponse {
    fn from(lessons: Vec<ScheduledLesson>) -> Self {
        Self {
            count: lessons.len(),
            lessons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_ordered_slots() {
        let slots: Vec<_> = TimeSlot::all().collect();
        assert_eq!(slots.len(), TimeSlot::COUNT);
        assert_eq!(TimeSlot::COUNT, 12);
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(slots[0].to_string(), "Sáng thứ 2");
        assert_eq!(slots[11].to_string(), "Chiều thứ 7");
    }

    #[test]
    fn lesson_serializes_with_labels() {
        let lesson = ScheduledLesson {
            class: ClassId(3),
            subject: "TOÁN".to_string(),
            teacher: TeacherId(2),
            slot: TimeSlot {
                day: Day::Wednesday,
                shift: Shift::Afternoon,
            },
            room: Room::Lab(1),
        };
        let json = serde_json::to_value(&lesson).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "class": "Lớp 3",
                "subject": "TOÁN",
                "teacher": "GV2",
                "time": "Chiều thứ 4",
                "room": "Lab 1",
            })
        );
    }

    #[test]
    fn request_defaults_optional_fields() {
        let request: ScheduleRequest = serde_json::from_str(
            r#"{"classes": 2, "teachers": 1, "rooms": 1, "subjects": ["Toán"]}"#,
        )
        .unwrap();
        assert_eq!(request.labs, 0);
        assert!(request.lab_subjects.is_empty());
        assert_eq!(request.seed, None);
    }
}
