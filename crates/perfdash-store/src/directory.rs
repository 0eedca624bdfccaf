//! In-memory entity directory.

use async_trait::async_trait;
use perfdash_core::{
    CompanyId, Department, DepartmentId, DepartmentMember, EntityDirectory, Employee,
    HierarchyEdge, Indicator, MemberRole, MetricDescriptor, MetricId, Owner, Result, UserId,
};
use std::collections::HashMap;

/// Entity metadata assembled up front with builder methods.
///
/// Department hierarchy edges are maintained as a closure table: adding a
/// department under a parent links it to the parent and to every ancestor of
/// the parent.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    employees: Vec<Employee>,
    metrics: HashMap<MetricId, MetricDescriptor>,
    assignments: HashMap<(CompanyId, Owner), Vec<MetricId>>,
    departments: Vec<Department>,
    edges: Vec<HierarchyEdge>,
    members: Vec<DepartmentMember>,
    indicators: HashMap<CompanyId, Vec<Indicator>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an employee.
    #[must_use]
    pub fn with_employee(
        mut self,
        company: &CompanyId,
        id: impl Into<UserId>,
        name: impl Into<String>,
    ) -> Self {
        self.employees.push(Employee {
            id: id.into(),
            name: name.into(),
            company_id: company.clone(),
        });
        self
    }

    /// Registers a metric descriptor.
    #[must_use]
    pub fn with_metric(mut self, descriptor: MetricDescriptor) -> Self {
        self.metrics.insert(descriptor.id.clone(), descriptor);
        self
    }

    /// Assigns a metric id to an owner. The id does not have to be registered.
    #[must_use]
    pub fn with_assignment(mut self, company: &CompanyId, owner: Owner, metric: impl Into<MetricId>) -> Self {
        self.assignments
            .entry((company.clone(), owner))
            .or_default()
            .push(metric.into());
        self
    }

    /// Adds a department, optionally below `parent`.
    #[must_use]
    pub fn with_department(
        mut self,
        company: &CompanyId,
        id: impl Into<DepartmentId>,
        name: impl Into<String>,
        parent: Option<&DepartmentId>,
    ) -> Self {
        let id = id.into();
        if let Some(parent) = parent {
            let mut ancestors: Vec<HierarchyEdge> = self
                .edges
                .iter()
                .filter(|edge| &edge.descendant == parent)
                .map(|edge| HierarchyEdge {
                    ancestor: edge.ancestor.clone(),
                    descendant: id.clone(),
                    depth: edge.depth + 1,
                })
                .collect();
            ancestors.push(HierarchyEdge {
                ancestor: parent.clone(),
                descendant: id.clone(),
                depth: 1,
            });
            self.edges.extend(ancestors);
        }
        self.departments.push(Department {
            id,
            name: name.into(),
            company_id: company.clone(),
        });
        self
    }

    /// Links a user to a department.
    #[must_use]
    pub fn with_member(
        mut self,
        department: impl Into<DepartmentId>,
        user: impl Into<UserId>,
        role: MemberRole,
    ) -> Self {
        self.members.push(DepartmentMember {
            department_id: department.into(),
            user_id: user.into(),
            role,
        });
        self
    }

    /// Adds an indicator to a company.
    #[must_use]
    pub fn with_indicator(mut self, company: &CompanyId, descriptor: MetricDescriptor, key: bool) -> Self {
        self.indicators
            .entry(company.clone())
            .or_default()
            .push(Indicator { descriptor, key });
        self
    }

    fn company_departments(&self, company: &CompanyId) -> impl Iterator<Item = &Department> {
        self.departments
            .iter()
            .filter(move |dept| &dept.company_id == company)
    }
}

#[async_trait]
impl EntityDirectory for InMemoryDirectory {
    async fn employee(&self, id: &UserId) -> Result<Option<Employee>> {
        Ok(self.employees.iter().find(|e| &e.id == id).cloned())
    }

    async fn employees(&self, company: &CompanyId) -> Result<Vec<Employee>> {
        Ok(self
            .employees
            .iter()
            .filter(|e| &e.company_id == company)
            .cloned()
            .collect())
    }

    async fn metric(&self, id: &MetricId) -> Result<Option<MetricDescriptor>> {
        Ok(self.metrics.get(id).cloned())
    }

    async fn metric_assignments(&self, company: &CompanyId, owner: &Owner) -> Result<Vec<MetricId>> {
        Ok(self
            .assignments
            .get(&(company.clone(), owner.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn departments(&self, company: &CompanyId) -> Result<Vec<Department>> {
        Ok(self.company_departments(company).cloned().collect())
    }

    async fn hierarchy(&self, company: &CompanyId) -> Result<Vec<HierarchyEdge>> {
        let ids: Vec<&DepartmentId> = self.company_departments(company).map(|d| &d.id).collect();
        Ok(self
            .edges
            .iter()
            .filter(|edge| ids.contains(&&edge.descendant))
            .cloned()
            .collect())
    }

    async fn department_members(&self, company: &CompanyId) -> Result<Vec<DepartmentMember>> {
        let ids: Vec<&DepartmentId> = self.company_departments(company).map(|d| &d.id).collect();
        Ok(self
            .members
            .iter()
            .filter(|member| ids.contains(&&member.department_id))
            .cloned()
            .collect())
    }

    async fn indicators(&self, company: &CompanyId) -> Result<Vec<Indicator>> {
        Ok(self.indicators.get(company).cloned().unwrap_or_default())
    }
}
