//! Builds the timetabling constraint problem and turns solutions back into
//! lessons.
//!
//! One variable per (class, subject). Its values are (slot, room) pairs from
//! the regular or lab pool. Every pair of variables gets a room clash
//! constraint; pairs sharing a teacher or a class also may not share a slot.

use crate::csp::{BinaryConstraint, ConstraintProblem, ModelError, VarId};
use crate::data::{
    ClassId, Placement, Room, ScheduleRequest, ScheduledLesson, TeacherId, TimeSlot,
};
use crate::error::RequestError;
use crate::search::{Backtracking, SearchLimits, SearchOutcome};
use itertools::Itertools;
use log::{debug, info};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Lower-cased name, used for matching.
    pub key: String,
    pub label: String,
    pub needs_lab: bool,
}

impl Subject {
    pub fn new(name: &str) -> Self {
        Self {
            key: name.to_lowercase(),
            label: name.to_string(),
            needs_lab: false,
        }
    }

    pub fn lab(name: &str) -> Self {
        Self {
            needs_lab: true,
            ..Self::new(name)
        }
    }
}

/// Validated input of the problem builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableParams {
    pub classes: u32,
    pub teachers: u32,
    pub subjects: Vec<Subject>,
    pub rooms: u32,
    pub labs: u32,
}

impl TryFrom<&ScheduleRequest> for TimetableParams {
    type Error = RequestError;

    fn try_from(request: &ScheduleRequest) -> Result<Self, Self::Error> {
        let mut subjects: Vec<Subject> = Vec::new();
        for name in request.subjects.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let key = name.to_lowercase();
            match subjects.iter_mut().find(|s| s.key == key) {
                Some(existing) => existing.label = name.to_string(),
                None => subjects.push(Subject::new(name)),
            }
        }

        if subjects.is_empty() {
            return Err(RequestError::NoSubjects);
        }
        if subjects.len() > request.teachers as usize {
            return Err(RequestError::TooFewTeachers {
                subjects: subjects.len(),
                teachers: request.teachers,
            });
        }
        for (field, value) in [
            ("classes", request.classes),
            ("teachers", request.teachers),
            ("rooms", request.rooms),
        ] {
            if value == 0 {
                return Err(RequestError::NotPositive { field });
            }
        }

        let mut unknown = Vec::new();
        for name in request.lab_subjects.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let key = name.to_lowercase();
            match subjects.iter_mut().find(|s| s.key == key) {
                Some(subject) => subject.needs_lab = true,
                None => unknown.push(name.to_string()),
            }
        }
        if !unknown.is_empty() {
            return Err(RequestError::UnknownLabSubjects {
                unknown,
                known: subjects.iter().map(|s| s.label.clone()).collect(),
            });
        }

        Ok(Self {
            classes: request.classes,
            teachers: request.teachers,
            subjects,
            rooms: request.rooms,
            labs: request.labs,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClashKind {
    /// Same slot and same room.
    RoomSlot,
    /// Same teacher, same slot.
    Teacher,
    /// Same class, same slot.
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clash {
    pub first: VarId,
    pub second: VarId,
    pub kind: ClashKind,
}

impl BinaryConstraint<Placement> for Clash {
    fn scope(&self) -> (VarId, VarId) {
        (self.first, self.second)
    }

    fn is_satisfied(&self, first: &Placement, second: &Placement) -> bool {
        match self.kind {
            ClashKind::RoomSlot => first != second,
            ClashKind::Teacher | ClashKind::Class => first.slot != second.slot,
        }
    }
}

/// What a variable stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lesson {
    pub class: ClassId,
    /// Index into `TimetableParams::subjects`.
    pub subject: usize,
    pub teacher: TeacherId,
}

pub struct TimetableProblem {
    /// Indexed by variable.
    pub lessons: Vec<Lesson>,
    pub csp: ConstraintProblem<Placement, Clash>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("the parameters do not describe a schedulable timetable")]
    InvalidParameters,
    #[error("no feasible schedule exists for these classes, rooms and teachers")]
    Infeasible,
    #[error("no schedule found within {0} search steps")]
    SearchLimit(u64),
    #[error("{lessons} lessons requested, at most {max} can be scheduled at once")]
    TooLarge { lessons: u64, max: u64 },
    #[error("malformed constraint problem: {0}")]
    Model(#[from] ModelError),
}

/// Teachers able to teach subject `subject`: teacher `i` teaches subject
/// `i mod subject_count`.
fn qualified_teachers(teachers: u32, subject_count: usize, subject: usize) -> Vec<TeacherId> {
    (subject..teachers as usize)
        .step_by(subject_count)
        .map(|i| TeacherId(i as u32 + 1))
        .collect()
}

/// Largest number of lessons a single request may ask for. Constraint
/// generation is quadratic in this.
pub const MAX_LESSONS: u64 = 1_000;

/// Expands timetable parameters into a constraint problem.
///
/// Teachers are picked per lesson, uniformly among the qualified ones, and
/// the slot order is shuffled; both draw from `rng`. Instances that break a
/// counting bound are reported as `Infeasible` before anything is allocated.
pub fn build_problem<R: Rng + ?Sized>(
    params: &TimetableParams,
    rng: &mut R,
) -> Result<TimetableProblem, ScheduleError> {
    let subject_count = params.subjects.len();
    if subject_count == 0 || params.classes == 0 || subject_count > params.teachers as usize {
        return Err(ScheduleError::InvalidParameters);
    }
    if let Some(reason) = capacity_shortfall(params) {
        debug!("Rejected without searching: {reason}");
        return Err(ScheduleError::Infeasible);
    }
    let lesson_count = u64::from(params.classes) * subject_count as u64;
    if lesson_count > MAX_LESSONS {
        return Err(ScheduleError::TooLarge {
            lessons: lesson_count,
            max: MAX_LESSONS,
        });
    }

    let mut slots: Vec<TimeSlot> = TimeSlot::all().collect();
    slots.shuffle(rng);
    let regular = (1..=params.rooms).map(Room::Regular).collect_vec();
    let labs = (1..=params.labs).map(Room::Lab).collect_vec();
    let qualified = (0..subject_count)
        .map(|s| qualified_teachers(params.teachers, subject_count, s))
        .collect_vec();

    let mut lessons = Vec::with_capacity(lesson_count as usize);
    let mut domains = Vec::with_capacity(lessons.capacity());
    for class in (1..=params.classes).map(ClassId) {
        for (subject, spec) in params.subjects.iter().enumerate() {
            let Some(&teacher) = qualified[subject].choose(rng) else {
                return Err(ScheduleError::InvalidParameters);
            };
            lessons.push(Lesson {
                class,
                subject,
                teacher,
            });

            let pool = if spec.needs_lab { &labs } else { &regular };
            domains.push(
                slots
                    .iter()
                    .flat_map(|&slot| pool.iter().map(move |&room| Placement { slot, room }))
                    .collect_vec(),
            );
        }
    }

    if let Some(reason) = teacher_overload(&lessons) {
        debug!("Rejected without searching: {reason}");
        return Err(ScheduleError::Infeasible);
    }

    let mut constraints = Vec::new();
    for (first, second) in (0..lessons.len()).tuple_combinations() {
        let clash = |kind| Clash {
            first,
            second,
            kind,
        };
        constraints.push(clash(ClashKind::RoomSlot));
        if lessons[first].teacher == lessons[second].teacher {
            constraints.push(clash(ClashKind::Teacher));
        }
        if lessons[first].class == lessons[second].class {
            constraints.push(clash(ClashKind::Class));
        }
    }

    let csp = ConstraintProblem::new(domains, constraints)?;
    Ok(TimetableProblem { lessons, csp })
}

/// Slot and room counting bounds every feasible timetable meets. Returns
/// the first one that is broken.
fn capacity_shortfall(params: &TimetableParams) -> Option<String> {
    let slots = TimeSlot::COUNT as u64;
    let subject_count = params.subjects.len() as u64;
    if subject_count > slots {
        return Some(format!(
            "each class needs {subject_count} slots but only {slots} exist"
        ));
    }

    let lab_subjects = params.subjects.iter().filter(|s| s.needs_lab).count() as u64;
    for (kind, subjects, rooms) in [
        ("regular", subject_count - lab_subjects, params.rooms),
        ("lab", lab_subjects, params.labs),
    ] {
        let demand = u64::from(params.classes).checked_mul(subjects);
        let capacity = slots.checked_mul(u64::from(rooms));
        match (demand, capacity) {
            (Some(demand), Some(capacity)) if demand <= capacity => {}
            _ => {
                return Some(format!(
                    "{} classes need {subjects} {kind} lessons each but {rooms} {kind} rooms \
                     give {slots} slots apiece",
                    params.classes
                ));
            }
        }
    }
    None
}

/// A teacher can give at most one lesson per slot.
fn teacher_overload(lessons: &[Lesson]) -> Option<String> {
    let slots = TimeSlot::COUNT;
    lessons
        .iter()
        .counts_by(|lesson| lesson.teacher)
        .into_iter()
        .filter(|&(_, load)| load > slots)
        .min_by_key(|&(teacher, _)| teacher)
        .map(|(teacher, load)| format!("{teacher} has {load} lessons for {slots} slots"))
}

/// Builds and solves a timetable, returning lessons sorted by class and time.
pub fn generate_schedule<R: Rng + ?Sized>(
    params: &TimetableParams,
    limits: SearchLimits,
    rng: &mut R,
) -> Result<Vec<ScheduledLesson>, ScheduleError> {
    let problem = build_problem(params, rng)?;
    info!(
        "Built timetable problem with {} lessons and {} constraints",
        problem.lessons.len(),
        problem.csp.constraints().len()
    );

    let start_time = Instant::now();
    let mut search = Backtracking::with_limits(&problem.csp, limits);
    let outcome = search.solve();
    let stats = search.stats();
    info!(
        "Search finished in {:.2?}: {} nodes, {} wipeouts, {} backtracks",
        start_time.elapsed(),
        stats.nodes,
        stats.wipeouts,
        stats.backtracks
    );

    let assignment = match outcome {
        SearchOutcome::Solved(assignment) => assignment,
        SearchOutcome::Exhausted => return Err(ScheduleError::Infeasible),
        SearchOutcome::LimitReached => return Err(ScheduleError::SearchLimit(stats.nodes)),
    };

    let mut schedule = assignment
        .iter()
        .map(|(var, placement)| {
            let lesson = problem.lessons[var];
            ScheduledLesson {
                class: lesson.class,
                subject: params.subjects[lesson.subject].label.to_uppercase(),
                teacher: lesson.teacher,
                slot: placement.slot,
                room: placement.room,
            }
        })
        .collect_vec();
    schedule.sort_by_key(|lesson| (lesson.class, lesson.slot));
    Ok(schedule)
}
